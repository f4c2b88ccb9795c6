use crate::ast::{Expr, ExprKind, FunctionDecl, LiteralValue, Stmt};

/// Converts the AST to a parenthesised prefix form, e.g. `1 + 2 * 3`
/// becomes `(+ 1.0 (* 2.0 3.0))`.  Used by the `parse` subcommand.
pub struct AstPrinter;

impl AstPrinter {
    pub fn print(expr: &Expr) -> String {
        match &expr.kind {
            // ── literals ────────────────────────────────────────────────
            ExprKind::Literal(lit) => match lit {
                LiteralValue::True => "true".into(),

                LiteralValue::False => "false".into(),

                LiteralValue::Nil => "nil".into(),

                LiteralValue::Str(s) => s.clone(),

                LiteralValue::Number(n) => {
                    if n.fract() == 0.0 {
                        // 3 → 3.0
                        format!("{:.1}", n)
                    } else {
                        n.to_string()
                    }
                }
            },

            ExprKind::Grouping(inner) => format!("(group {})", Self::print(inner)),

            ExprKind::Unary { operator, right } => {
                format!("({} {})", operator.lexeme, Self::print(right))
            }

            ExprKind::Binary {
                left,
                operator,
                right,
            }
            | ExprKind::Logical {
                left,
                operator,
                right,
            } => format!(
                "({} {} {})",
                operator.lexeme,
                Self::print(left),
                Self::print(right)
            ),

            ExprKind::Variable(name) => name.lexeme.clone(),

            ExprKind::This(_) => "this".into(),

            ExprKind::Assign { name, value } => format!("(= {} {})", name.lexeme, Self::print(value)),

            ExprKind::Call {
                callee, arguments, ..
            } => {
                let mut s = format!("(call {}", Self::print(callee));
                for arg in arguments {
                    s.push(' ');
                    s.push_str(&Self::print(arg));
                }
                s.push(')');
                s
            }

            ExprKind::Get { object, name } => format!("(. {} {})", Self::print(object), name.lexeme),

            ExprKind::Set {
                object,
                name,
                value,
            } => format!(
                "(= (. {} {}) {})",
                Self::print(object),
                name.lexeme,
                Self::print(value)
            ),
        }
    }

    pub fn print_stmt(stmt: &Stmt) -> String {
        match stmt {
            Stmt::Expression(expr) => format!("(; {})", Self::print(expr)),

            Stmt::Print(expr) => format!("(print {})", Self::print(expr)),

            Stmt::Var { name, initializer } => match initializer {
                Some(init) => format!("(var {} {})", name.lexeme, Self::print(init)),
                None => format!("(var {})", name.lexeme),
            },

            Stmt::Block(statements) => {
                let mut s = String::from("(block");
                for inner in statements {
                    s.push(' ');
                    s.push_str(&Self::print_stmt(inner));
                }
                s.push(')');
                s
            }

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => match else_branch {
                Some(else_branch) => format!(
                    "(if {} {} {})",
                    Self::print(condition),
                    Self::print_stmt(then_branch),
                    Self::print_stmt(else_branch)
                ),
                None => format!(
                    "(if {} {})",
                    Self::print(condition),
                    Self::print_stmt(then_branch)
                ),
            },

            Stmt::While { condition, body } => format!(
                "(while {} {})",
                Self::print(condition),
                Self::print_stmt(body)
            ),

            Stmt::Function(declaration) => Self::print_function("fun", declaration),

            Stmt::Return { value, .. } => match value {
                Some(value) => format!("(return {})", Self::print(value)),
                None => "(return)".into(),
            },

            Stmt::Class { name, methods } => {
                let mut s = format!("(class {}", name.lexeme);
                for method in methods {
                    s.push(' ');
                    s.push_str(&Self::print_function("method", method));
                }
                s.push(')');
                s
            }
        }
    }

    fn print_function(keyword: &str, function: &FunctionDecl) -> String {
        let params: Vec<&str> = function.params.iter().map(|p| p.lexeme.as_str()).collect();

        let mut s = format!("({} {}({})", keyword, function.name.lexeme, params.join(" "));
        for stmt in &function.body {
            s.push(' ');
            s.push_str(&Self::print_stmt(stmt));
        }
        s.push(')');
        s
    }
}
