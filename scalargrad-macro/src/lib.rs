use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{
    parse_macro_input, spanned::Spanned, BinOp, Block, Expr, Ident, Pat, Stmt, UnOp,
};

/// Turns a block of `let` statements into a scalargrad graph.
///
/// Every binding becomes a `scalargrad::Value`: literals become named leaves, arithmetic and
/// `relu`/`exp`/`tanh`/`pow` become operator nodes. Division and `pow` are fallible and expand
/// with `?`, so the enclosing function has to return a compatible `Result`.
#[proc_macro]
pub fn scalargrad(input: TokenStream) -> TokenStream {
    // Parse the input tokens into a syntax tree
    let input = parse_macro_input!(input as Block);

    let mut objs = vec![];

    for stmt in &input.stmts {
        traverse_stmt(stmt, &mut objs);
    }

    // Build the output, possibly using quasi-quotation
    let expanded = quote! {
        #(#objs)*
    };

    // Hand the output tokens back to the compiler
    TokenStream::from(expanded)
}

fn traverse_stmt(input: &Stmt, terms: &mut Vec<TokenStream2>) {
    match input {
        Stmt::Local(local) => {
            if let (Pat::Ident(id), Some(init)) = (&local.pat, &local.init) {
                let name = id.ident.clone();
                let ex = &init.expr;
                let ts = match ex as &Expr {
                    lit if is_literal(lit) => quote! {
                        let #name = ::scalargrad::Value::named(stringify!(#name), (#lit) as f64);
                    },
                    Expr::Path(path) => quote! {
                        let #name = #path.clone();
                    },
                    _ => {
                        if let Some(res) = traverse_expr(ex, terms) {
                            quote! {
                                let #name = #res;
                            }
                        } else {
                            quote! {
                                let #name = ::scalargrad::Value::named(stringify!(#name), 1.);
                            }
                        }
                    }
                };
                terms.push(ts);
            }
        }
        Stmt::Expr(ex, _) => {
            traverse_expr(ex, terms);
        }
        _ => (),
    }
}

fn var_name(terms: &[TokenStream2]) -> String {
    format!("_a{}", terms.len())
}

/// A number literal, possibly negated or parenthesized.
fn is_literal(ex: &Expr) -> bool {
    match ex {
        Expr::Lit(_) => true,
        Expr::Unary(ex) => matches!(ex.op, UnOp::Neg(_)) && is_literal(&ex.expr),
        Expr::Paren(ex) => is_literal(&ex.expr),
        _ => false,
    }
}

fn format_term(ex: &Expr, terms: &mut Vec<TokenStream2>) -> Ident {
    let name = Ident::new(&var_name(terms), ex.span());
    let ts = quote! {
        let #name = ::scalargrad::Value::named(stringify!(#name), (#ex) as f64);
    };
    terms.push(ts);
    name
}

fn push_term(ex: &impl Spanned, value: TokenStream2, terms: &mut Vec<TokenStream2>) -> Ident {
    let name = Ident::new(&var_name(terms), ex.span());
    terms.push(quote! {
        let #name = #value;
    });
    name
}

fn unary_fn(func: &Ident, arg: &Ident) -> Option<TokenStream2> {
    match func.to_string().as_str() {
        "relu" | "exp" | "tanh" => Some(quote! { #arg.#func() }),
        _ => None,
    }
}

fn traverse_expr(input: &Expr, terms: &mut Vec<TokenStream2>) -> Option<Ident> {
    if is_literal(input) {
        return Some(format_term(input, terms));
    }
    match input {
        Expr::Binary(ex) => {
            let lhs = traverse_expr(&ex.left, terms)?;
            let rhs = traverse_expr(&ex.right, terms)?;
            let binop = match ex.op {
                BinOp::Add(_) => quote! { &#lhs + &#rhs },
                BinOp::Sub(_) => quote! { &#lhs - &#rhs },
                BinOp::Mul(_) => quote! { &#lhs * &#rhs },
                BinOp::Div(_) => quote! { (&#lhs / &#rhs)? },
                _ => return None,
            };
            Some(push_term(ex, binop, terms))
        }
        Expr::Unary(ex) => {
            if let UnOp::Neg(_) = ex.op {
                let term = traverse_expr(&ex.expr, terms)?;
                Some(push_term(ex, quote! { -&#term }, terms))
            } else {
                None
            }
        }
        Expr::Paren(ex) => traverse_expr(&ex.expr, terms),
        Expr::Path(path) => path.path.segments.last().map(|seg| seg.ident.clone()),
        Expr::Call(call) => {
            if let (Expr::Path(func), Some(arg)) = (&call.func as &Expr, call.args.first()) {
                let func = func.path.segments.last().map(|seg| seg.ident.clone())?;
                let arg = traverse_expr(arg, terms)?;
                let value = unary_fn(&func, &arg)?;
                Some(push_term(call, value, terms))
            } else {
                None
            }
        }
        Expr::MethodCall(call) => {
            let receiver = traverse_expr(&call.receiver, terms)?;
            let method = &call.method;
            let value = if call.method == "pow" {
                let exp = call.args.first()?;
                quote! { #receiver.pow((#exp) as f64)? }
            } else {
                unary_fn(method, &receiver)?
            };
            Some(push_term(call, value, terms))
        }
        _ => None,
    }
}
