use std::collections::HashMap;
use std::io::{self, Write};
use std::rc::Rc;

use log::{debug, info};

use crate::ast::{Expr, ExprId, ExprKind, LiteralValue, Stmt};
use crate::callable::NativeFunction;
use crate::class::{LoxClass, LoxInstance};
use crate::environment::{self, EnvRef, Environment};
use crate::error::{LoxError, Result};
use crate::function::LoxFunction;
use crate::stack::ensure_sufficient_stack;
use crate::token::{Token, TokenType};
use crate::value::Value;

/// Deepest allowed nesting of calls before the program is stopped.
pub const MAX_CALL_DEPTH: usize = 255;

/// How a statement finished.  `Return` unwinds to the innermost function
/// call; it is never reported as an error.
#[derive(Debug, Clone, PartialEq)]
pub enum Flow {
    Normal,
    Return(Value),
}

pub struct Interpreter {
    globals: EnvRef,
    environment: EnvRef,
    /// Resolver output: expression id → number of scope hops.
    locals: HashMap<ExprId, usize>,
    out: Box<dyn Write>,
    call_depth: usize,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    /// Creates an Interpreter printing to stdout, with native functions such
    /// as `clock` defined in its globals.
    pub fn new() -> Self {
        Self::with_output(Box::new(io::stdout()))
    }

    /// Same as [`Interpreter::new`] but `print` writes to `out`.
    pub fn with_output(out: Box<dyn Write>) -> Self {
        info!("Initializing Interpreter");

        let globals: EnvRef = Environment::new().into_ref();

        debug!("Defining native function 'clock'");

        globals
            .borrow_mut()
            .define("clock", Value::NativeFunction(Rc::new(NativeFunction::clock())));

        Self {
            environment: Rc::clone(&globals),
            globals,
            locals: HashMap::new(),
            out,
            call_depth: 0,
        }
    }

    /// Record that the variable expression `id` binds `depth` scopes out.
    /// Called by the resolver; each node is resolved at most once.
    pub fn note_local(&mut self, id: ExprId, depth: usize) {
        let previous: Option<usize> = self.locals.insert(id, depth);

        debug_assert!(previous.is_none(), "expression {:?} resolved twice", id);
    }

    /// Scope distance recorded for `id`, `None` for globals.
    pub fn local_depth(&self, id: ExprId) -> Option<usize> {
        self.locals.get(&id).copied()
    }

    /// Interprets a list of statements (a "program").  The first runtime
    /// error stops execution and is returned.
    pub fn interpret(&mut self, statements: &[Stmt]) -> Result<()> {
        debug!("Interpreting {} statements", statements.len());

        for stmt in statements {
            self.execute(stmt)?;
        }

        self.out.flush()?;

        info!("Interpretation completed successfully");
        Ok(())
    }

    /// Executes a single statement.  Nested statements recurse on the native
    /// stack, which is grown on demand.
    fn execute(&mut self, stmt: &Stmt) -> Result<Flow> {
        ensure_sufficient_stack(|| self.execute_stmt(stmt))
    }

    fn execute_stmt(&mut self, stmt: &Stmt) -> Result<Flow> {
        match stmt {
            Stmt::Expression(expr) => {
                self.evaluate(expr)?;
                Ok(Flow::Normal)
            }

            Stmt::Print(expr) => {
                let value: Value = self.evaluate(expr)?;
                writeln!(self.out, "{}", value)?;
                debug!("Printed value: {}", value);
                Ok(Flow::Normal)
            }

            Stmt::Var { name, initializer } => {
                let value: Value = match initializer {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };
                debug!("Defining variable '{}' = {}", name.lexeme, value);
                self.environment.borrow_mut().define(&name.lexeme, value);
                Ok(Flow::Normal)
            }

            Stmt::Block(statements) => {
                let environment = Environment::with_enclosing(Rc::clone(&self.environment));
                self.execute_block(statements, environment.into_ref())
            }

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if self.evaluate(condition)?.is_truthy() {
                    self.execute(then_branch)
                } else if let Some(else_stmt) = else_branch {
                    self.execute(else_stmt)
                } else {
                    Ok(Flow::Normal)
                }
            }

            Stmt::While { condition, body } => {
                while self.evaluate(condition)?.is_truthy() {
                    if let Flow::Return(value) = self.execute(body)? {
                        return Ok(Flow::Return(value));
                    }
                }
                Ok(Flow::Normal)
            }

            Stmt::Function(declaration) => {
                debug!("Defining function '{}'", declaration.name.lexeme);
                let function = LoxFunction::new(
                    Rc::clone(declaration),
                    Rc::clone(&self.environment),
                    false,
                );
                self.environment
                    .borrow_mut()
                    .define(&declaration.name.lexeme, Value::Function(Rc::new(function)));
                Ok(Flow::Normal)
            }

            Stmt::Return { value, .. } => {
                let value: Value = match value {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };
                debug!("Returning value: {}", value);
                Ok(Flow::Return(value))
            }

            Stmt::Class { name, methods } => {
                debug!("Defining class '{}'", name.lexeme);

                // predeclared so methods can refer to the class by name
                self.environment
                    .borrow_mut()
                    .define(&name.lexeme, Value::Nil);

                let methods: HashMap<String, Rc<LoxFunction>> = methods
                    .iter()
                    .map(|method| {
                        let function = LoxFunction::new(
                            Rc::clone(method),
                            Rc::clone(&self.environment),
                            method.name.lexeme == "init",
                        );
                        (method.name.lexeme.clone(), Rc::new(function))
                    })
                    .collect();

                let class = LoxClass::new(&name.lexeme, methods);
                self.environment
                    .borrow_mut()
                    .assign(name, Value::Class(Rc::new(class)))?;
                Ok(Flow::Normal)
            }
        }
    }

    /// Run `statements` with `environment` as the current frame.  The
    /// previous frame is restored on every exit path: normal completion,
    /// `return`, or a runtime error.
    pub fn execute_block(&mut self, statements: &[Stmt], environment: EnvRef) -> Result<Flow> {
        let previous: EnvRef = std::mem::replace(&mut self.environment, environment);

        let mut result: Result<Flow> = Ok(Flow::Normal);

        for stmt in statements {
            match self.execute(stmt) {
                Ok(Flow::Normal) => {}
                other => {
                    result = other;
                    break;
                }
            }
        }

        self.environment = previous;
        result
    }

    /// Evaluates an expression and returns a Value.
    pub fn evaluate(&mut self, expr: &Expr) -> Result<Value> {
        ensure_sufficient_stack(|| self.evaluate_expr(expr))
    }

    fn evaluate_expr(&mut self, expr: &Expr) -> Result<Value> {
        match &expr.kind {
            ExprKind::Literal(literal) => Ok(match literal {
                LiteralValue::Number(n) => Value::Number(*n),
                LiteralValue::Str(s) => Value::String(s.clone()),
                LiteralValue::True => Value::Bool(true),
                LiteralValue::False => Value::Bool(false),
                LiteralValue::Nil => Value::Nil,
            }),

            ExprKind::Grouping(inner) => self.evaluate(inner),

            ExprKind::Unary { operator, right } => self.evaluate_unary(operator, right),

            ExprKind::Binary {
                left,
                operator,
                right,
            } => self.evaluate_binary(left, operator, right),

            ExprKind::Logical {
                left,
                operator,
                right,
            } => {
                let left_val: Value = self.evaluate(left)?;

                if operator.token_type == TokenType::OR {
                    if left_val.is_truthy() {
                        return Ok(left_val);
                    }
                } else if !left_val.is_truthy() {
                    return Ok(left_val);
                }

                self.evaluate(right)
            }

            ExprKind::Variable(name) | ExprKind::This(name) => self.look_up_variable(name, expr.id),

            ExprKind::Assign { name, value } => {
                let value: Value = self.evaluate(value)?;

                match self.local_depth(expr.id) {
                    Some(distance) => {
                        environment::assign_at(&self.environment, distance, name, value.clone())?
                    }
                    None => self.globals.borrow_mut().assign(name, value.clone())?,
                }

                Ok(value)
            }

            ExprKind::Call {
                callee,
                paren,
                arguments,
            } => {
                let callee_val: Value = self.evaluate(callee)?;

                let mut arg_values: Vec<Value> = Vec::with_capacity(arguments.len());
                for arg in arguments {
                    arg_values.push(self.evaluate(arg)?);
                }

                self.invoke_callable(&callee_val, paren, arg_values)
            }

            ExprKind::Get { object, name } => match self.evaluate(object)? {
                Value::Instance(instance) => LoxInstance::get(&instance, name),
                _ => Err(LoxError::runtime(name, "Only instances have properties.")),
            },

            ExprKind::Set {
                object,
                name,
                value,
            } => {
                let Value::Instance(instance) = self.evaluate(object)? else {
                    return Err(LoxError::runtime(name, "Only instances have fields."));
                };

                let value: Value = self.evaluate(value)?;
                instance.borrow_mut().set(name, value.clone());

                Ok(value)
            }
        }
    }

    fn look_up_variable(&self, name: &Token, id: ExprId) -> Result<Value> {
        match self.local_depth(id) {
            Some(distance) => environment::get_at(&self.environment, distance, name),
            None => self.globals.borrow().get(name),
        }
    }

    /// Evaluates a unary expression.
    fn evaluate_unary(&mut self, op: &Token, expr: &Expr) -> Result<Value> {
        let right_val: Value = self.evaluate(expr)?;

        match op.token_type {
            TokenType::MINUS => match right_val {
                Value::Number(n) => Ok(Value::Number(-n)),
                _ => Err(LoxError::runtime(op, "Operand must be a number.")),
            },
            TokenType::BANG => Ok(Value::Bool(!right_val.is_truthy())),
            _ => Err(LoxError::runtime(op, "Invalid unary operator.")),
        }
    }

    /// Evaluates a binary expression.  Both operands are evaluated, left
    /// first, before any type check.
    fn evaluate_binary(&mut self, left: &Expr, op: &Token, right: &Expr) -> Result<Value> {
        let left_val: Value = self.evaluate(left)?;
        let right_val: Value = self.evaluate(right)?;

        debug!(
            "Binary '{}' on {} and {}",
            op.lexeme,
            left_val.type_name(),
            right_val.type_name()
        );

        match op.token_type {
            TokenType::PLUS => match (left_val, right_val) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
                (Value::String(a), Value::String(b)) => Ok(Value::String(a + &b)),
                _ => Err(LoxError::runtime(
                    op,
                    "Operands must be two numbers or two strings.",
                )),
            },
            TokenType::EQUAL_EQUAL => Ok(Value::Bool(left_val == right_val)),
            TokenType::BANG_EQUAL => Ok(Value::Bool(left_val != right_val)),
            _ => {
                let (a, b) = number_operands(op, &left_val, &right_val)?;

                match op.token_type {
                    TokenType::MINUS => Ok(Value::Number(a - b)),
                    TokenType::STAR => Ok(Value::Number(a * b)),
                    TokenType::SLASH => Ok(Value::Number(a / b)),
                    TokenType::LESS => Ok(Value::Bool(a < b)),
                    TokenType::LESS_EQUAL => Ok(Value::Bool(a <= b)),
                    TokenType::GREATER => Ok(Value::Bool(a > b)),
                    TokenType::GREATER_EQUAL => Ok(Value::Bool(a >= b)),
                    _ => Err(LoxError::runtime(op, "Invalid binary operator.")),
                }
            }
        }
    }

    /// Invokes anything with the call capability: natives, functions, classes.
    fn invoke_callable(
        &mut self,
        callee_val: &Value,
        paren_token: &Token,
        arg_values: Vec<Value>,
    ) -> Result<Value> {
        let Some(callable) = callee_val.as_callable() else {
            return Err(LoxError::runtime(
                paren_token,
                "Can only call functions and classes.",
            ));
        };

        if arg_values.len() != callable.arity() {
            return Err(LoxError::runtime(
                paren_token,
                format!(
                    "Expected {} arguments but got {}.",
                    callable.arity(),
                    arg_values.len()
                ),
            ));
        }

        if self.call_depth >= MAX_CALL_DEPTH {
            return Err(LoxError::runtime(paren_token, "Stack overflow."));
        }

        debug!("Calling {} with {} argument(s)", callee_val, arg_values.len());

        self.call_depth += 1;
        let result: Result<Value> = callable.call(self, arg_values);
        self.call_depth -= 1;

        // natives fail without a source position; blame the call site
        result.map_err(|e| match e {
            LoxError::Native(message) => LoxError::runtime(paren_token, message),
            other => other,
        })
    }
}

fn number_operands(op: &Token, left: &Value, right: &Value) -> Result<(f64, f64)> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => Ok((*a, *b)),
        _ => Err(LoxError::runtime(op, "Operands must be numbers.")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;
    use crate::scanner::Scanner;

    fn failing(_args: &[Value]) -> std::result::Result<Value, String> {
        Err("Clock error: time went backwards".to_string())
    }

    #[test]
    fn native_failure_is_reported_at_the_call_site() {
        let mut interpreter = Interpreter::with_output(Box::new(io::sink()));
        let native = NativeFunction {
            name: "broken",
            arity: 0,
            func: failing,
        };
        interpreter
            .globals
            .borrow_mut()
            .define("broken", Value::NativeFunction(Rc::new(native)));

        let tokens: Vec<Token> = Scanner::new("print 1;\nbroken();")
            .filter_map(|t| t.ok())
            .collect();
        let parsed = Parser::new(tokens).parse();
        assert!(parsed.errors.is_empty());

        let err = interpreter
            .interpret(&parsed.statements)
            .expect_err("native failure should surface");

        assert_eq!(err.to_string(), "Clock error: time went backwards\n[line 2]");
        assert_eq!(interpreter.call_depth, 0);
    }
}
