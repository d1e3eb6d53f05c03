//! Host program text for a lowered [`Program`]
//!
//! The listing is what the lowering pass "emits": untyped bindings,
//! constructor calls, `__setLine` markers and `__checkLoop` guards. It is
//! never executed; the interpreter walks the AST directly. It exists for
//! diagnostics (`--lowered`) and for eyeballing what a source file turned into.

use crate::parser::ast::*;
use std::fmt::{self, Write};

const INDENT: &str = "    ";

fn join(items: &[Expr]) -> String {
    items
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Int(n) => write!(f, "{}", n),
            Literal::Float(x) => write!(f, "{:?}", x),
            Literal::Str(s) => write!(f, "{:?}", s),
            Literal::Bool(b) => write!(f, "{}", b),
            Literal::Null => write!(f, "null"),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Literal(lit) => write!(f, "{}", lit),
            Expr::Variable(name) => write!(f, "{}", name),
            Expr::Assign { target, value } => write!(f, "{} = {}", target, value),
            Expr::CompoundAssign { op, target, value } => {
                write!(f, "{} {}= {}", target, op.symbol(), value)
            }
            Expr::Step { op, target } => match op {
                StepOp::PreInc => write!(f, "++{}", target),
                StepOp::PreDec => write!(f, "--{}", target),
                StepOp::PostInc => write!(f, "{}++", target),
                StepOp::PostDec => write!(f, "{}--", target),
            },
            Expr::Binary { op, left, right } => write!(f, "({} {} {})", left, op.symbol(), right),
            Expr::Unary { op, operand } => {
                let symbol = match op {
                    UnOp::Neg => "-",
                    UnOp::Not => "!",
                    UnOp::BitNot => "~",
                };
                write!(f, "{}{}", symbol, operand)
            }
            Expr::Ternary {
                condition,
                then_expr,
                else_expr,
            } => write!(f, "({} ? {} : {})", condition, then_expr, else_expr),
            Expr::Call { name, args } => write!(f, "{}({})", name, join(args)),
            Expr::MethodCall {
                object,
                method,
                args,
            } => write!(f, "{}.{}({})", object, method, join(args)),
            Expr::Member { object, member } => write!(f, "{}.{}", object, member),
            Expr::Index { object, index } => write!(f, "{}[{}]", object, index),
            Expr::Guard(condition) => write!(f, "(__checkLoop(), {})", condition),
        }
    }
}

/// One-line form of a `for` initializer statement
fn inline(stmt: &Stmt) -> String {
    match stmt {
        Stmt::Let {
            name,
            init: Some(init),
        } => format!("let {} = {}", name, init),
        Stmt::Let { name, init: None } => format!("let {}", name),
        Stmt::Expr(expr) => expr.to_string(),
        _ => String::new(),
    }
}

fn write_block(out: &mut String, stmts: &[Stmt], depth: usize) -> fmt::Result {
    for stmt in stmts {
        write_stmt(out, stmt, depth)?;
    }
    Ok(())
}

fn write_stmt(out: &mut String, stmt: &Stmt, depth: usize) -> fmt::Result {
    let pad = INDENT.repeat(depth);

    match stmt {
        Stmt::Line(line) => writeln!(out, "{}__setLine({}, {:?});", pad, line.number, &*line.text),
        Stmt::Let {
            name,
            init: Some(init),
        } => writeln!(out, "{}let {} = {};", pad, name, init),
        Stmt::Let { name, init: None } => writeln!(out, "{}let {};", pad, name),
        Stmt::Construct { name, kind } => writeln!(
            out,
            "{}const {} = {}({:?});",
            pad,
            name,
            kind.constructor(),
            name
        ),
        Stmt::ArrayDecl { name, size, init } => {
            let size = size
                .as_ref()
                .map(|s| s.to_string())
                .unwrap_or_else(|| init.len().to_string());
            writeln!(
                out,
                "{}const {} = __createArray({:?}, {}, [{}]);",
                pad,
                name,
                name,
                size,
                join(init)
            )
        }
        Stmt::Expr(expr) => writeln!(out, "{}{};", pad, expr),
        Stmt::If {
            condition,
            then_branch,
            else_branch,
        } => {
            writeln!(out, "{}if ({}) {{", pad, condition)?;
            write_block(out, then_branch, depth + 1)?;
            if let Some(else_branch) = else_branch {
                writeln!(out, "{}}} else {{", pad)?;
                write_block(out, else_branch, depth + 1)?;
            }
            writeln!(out, "{}}}", pad)
        }
        Stmt::While { condition, body } => {
            writeln!(out, "{}while {} {{", pad, condition)?;
            write_block(out, body, depth + 1)?;
            writeln!(out, "{}}}", pad)
        }
        Stmt::DoWhile { body, condition } => {
            writeln!(out, "{}do {{", pad)?;
            write_block(out, body, depth + 1)?;
            writeln!(out, "{}}} while {};", pad, condition)
        }
        Stmt::For {
            init,
            condition,
            increment,
            body,
        } => {
            let init = init.iter().map(inline).collect::<Vec<_>>().join(", ");
            writeln!(out, "{}for ({}; {}; {}) {{", pad, init, condition, join(increment))?;
            write_block(out, body, depth + 1)?;
            writeln!(out, "{}}}", pad)
        }
        Stmt::Block(stmts) => {
            writeln!(out, "{}{{", pad)?;
            write_block(out, stmts, depth + 1)?;
            writeln!(out, "{}}}", pad)
        }
        Stmt::Return(Some(value)) => writeln!(out, "{}return {};", pad, value),
        Stmt::Return(None) => writeln!(out, "{}return;", pad),
        Stmt::Break => writeln!(out, "{}break;", pad),
        Stmt::Continue => writeln!(out, "{}continue;", pad),
        Stmt::Malformed(error) => {
            writeln!(out, "{}throw new SyntaxError({:?});", pad, error.to_string())
        }
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();

        for function in &self.functions {
            writeln!(out, "function {}({}) {{", function.name, function.params.join(", "))?;
            write_block(&mut out, &function.body, 1)?;
            writeln!(out, "}}")?;
        }

        write_block(&mut out, &self.body, 0)?;
        f.write_str(&out)
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::parse::rewrite;

    #[test]
    fn test_listing_of_a_small_program() {
        let source = "stack<int> s;\nint main() {\n  for (int i = 0; i < 2; i++) {\n    s.push(i);\n  }\n  return 0;\n}\n";
        let listing = rewrite(source).to_string();
        let expected = "\
function main() {
    __setLine(3, \"for (int i = 0; i < 2; i++) {\");
    for (let i = 0; (__checkLoop(), (i < 2)); i++) {
        __setLine(4, \"s.push(i);\");
        s.push(i);
    }
    __setLine(6, \"return 0;\");
    return 0;
}
__setLine(1, \"stack<int> s;\");
const s = __createStack(\"s\");
main();
";
        assert_eq!(listing, expected);
    }

    #[test]
    fn test_listing_of_arrays_and_guards() {
        let listing = rewrite("int arr[] = {1, 2};\nwhile (true) { }").to_string();
        assert!(listing.contains("const arr = __createArray(\"arr\", 2, [1, 2]);"));
        assert!(listing.contains("while (__checkLoop(), true) {"));
    }
}
