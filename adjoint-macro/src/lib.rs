use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{parse_macro_input, spanned::Spanned, BinOp, Block, Expr, Ident, Pat, Stmt, UnOp};

/// Expand a block of `let` statements into expression graph construction.
///
/// `let x;` declares a variable named `x`. Initializers may use numeric
/// literals, previously declared names, `+ - * /`, unary `-` and the functions
/// `sin cos exp log pow`.
#[proc_macro]
pub fn adjoint(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as Block);

    let mut terms = vec![];

    for stmt in &input.stmts {
        if let Err(e) = traverse_stmt(stmt, &mut terms) {
            return e.to_compile_error().into();
        }
    }

    let expanded = quote! {
        #(#terms)*
    };

    TokenStream::from(expanded)
}

fn traverse_stmt(input: &Stmt, terms: &mut Vec<TokenStream2>) -> syn::Result<()> {
    let Stmt::Local(local) = input else {
        return Err(syn::Error::new(input.span(), "expected a `let` statement"));
    };
    let Pat::Ident(id) = &local.pat else {
        return Err(syn::Error::new(local.pat.span(), "expected a name"));
    };
    let name = id.ident.clone();
    let ts = match &local.init {
        None => quote! {
            let #name = ::adjoint::Node::variable(stringify!(#name));
        },
        Some(init) => {
            let res = traverse_expr(&init.expr, terms)?;
            quote! {
                let #name = ::core::clone::Clone::clone(&#res);
            }
        }
    };
    terms.push(ts);
    Ok(())
}

fn var_name(terms: &[TokenStream2], span: proc_macro2::Span) -> Ident {
    Ident::new(&format!("_a{}", terms.len()), span)
}

fn push_term(value: TokenStream2, span: proc_macro2::Span, terms: &mut Vec<TokenStream2>) -> Ident {
    let name = var_name(terms, span);
    terms.push(quote! {
        let #name = #value;
    });
    name
}

fn traverse_expr(input: &Expr, terms: &mut Vec<TokenStream2>) -> syn::Result<Ident> {
    match input {
        Expr::Binary(ex) => {
            let lhs = traverse_expr(&ex.left, terms)?;
            let rhs = traverse_expr(&ex.right, terms)?;
            let builder = match ex.op {
                BinOp::Add(_) => quote! { ::adjoint::add },
                BinOp::Sub(_) => quote! { ::adjoint::sub },
                BinOp::Mul(_) => quote! { ::adjoint::mul },
                BinOp::Div(_) => quote! { ::adjoint::div },
                _ => return Err(syn::Error::new(ex.op.span(), "unsupported operator")),
            };
            Ok(push_term(quote! { #builder(&#lhs, &#rhs) }, ex.span(), terms))
        }
        Expr::Paren(ex) => traverse_expr(&ex.expr, terms),
        Expr::Lit(lit) => Ok(push_term(
            quote! { ::adjoint::Node::real(#lit as f64) },
            lit.span(),
            terms,
        )),
        Expr::Unary(ex) if matches!(ex.op, UnOp::Neg(_)) => {
            if let Expr::Lit(lit) = &*ex.expr {
                return Ok(push_term(
                    quote! { ::adjoint::Node::real(-(#lit as f64)) },
                    ex.span(),
                    terms,
                ));
            }
            let operand = traverse_expr(&ex.expr, terms)?;
            let zero = push_term(quote! { ::adjoint::Node::real(0.) }, ex.span(), terms);
            Ok(push_term(
                quote! { ::adjoint::sub(&#zero, &#operand) },
                ex.span(),
                terms,
            ))
        }
        Expr::Path(path) => path
            .path
            .get_ident()
            .cloned()
            .ok_or_else(|| syn::Error::new(path.span(), "expected a name")),
        Expr::Call(call) => {
            let Expr::Path(func) = &*call.func else {
                return Err(syn::Error::new(call.func.span(), "expected a function name"));
            };
            let func_name = func
                .path
                .get_ident()
                .map(|ident| ident.to_string())
                .unwrap_or_default();
            let arity = match func_name.as_str() {
                "sin" | "cos" | "exp" | "log" => 1,
                "pow" => 2,
                _ => {
                    return Err(syn::Error::new(
                        func.span(),
                        "expected one of `sin`, `cos`, `exp`, `log`, `pow`",
                    ))
                }
            };
            if call.args.len() != arity {
                return Err(syn::Error::new(
                    call.span(),
                    format!("`{func_name}` takes {arity} argument(s)"),
                ));
            }
            let args = call
                .args
                .iter()
                .map(|arg| traverse_expr(arg, terms))
                .collect::<syn::Result<Vec<_>>>()?;
            let builder = Ident::new(&func_name, func.span());
            Ok(push_term(
                quote! { ::adjoint::#builder(#(&#args),*) },
                call.span(),
                terms,
            ))
        }
        _ => Err(syn::Error::new(input.span(), "unsupported expression")),
    }
}
