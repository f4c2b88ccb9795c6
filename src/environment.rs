//! Scope frames for the tree‑walking interpreter.
//!
//! Frames are shared (`Rc<RefCell<_>>`): a block or call creates a child
//! frame, and any closure created inside keeps that frame alive for as long
//! as the closure itself lives.

use crate::error::{LoxError, Result};
use crate::token::Token;
use crate::value::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Shared handle to an environment frame.
pub type EnvRef = Rc<RefCell<Environment>>;

#[derive(Debug, Default)]
pub struct Environment {
    values: HashMap<String, Value>,
    enclosing: Option<EnvRef>,
}

impl Environment {
    /// The global frame (no enclosing scope).
    pub fn new() -> Self {
        Environment {
            values: HashMap::new(),
            enclosing: None,
        }
    }

    pub fn with_enclosing(enclosing: EnvRef) -> Self {
        Environment {
            values: HashMap::new(),
            enclosing: Some(enclosing),
        }
    }

    /// Wrap into a shareable handle.
    pub fn into_ref(self) -> EnvRef {
        Rc::new(RefCell::new(self))
    }

    pub fn enclosing(&self) -> Option<EnvRef> {
        self.enclosing.clone()
    }

    /// Bind (or re‑bind) `name` in this frame.
    pub fn define(&mut self, name: &str, value: Value) {
        self.values.insert(name.to_string(), value);
    }

    /// Look `name` up in this frame only.
    pub fn get_here(&self, name: &str) -> Option<Value> {
        self.values.get(name).cloned()
    }

    /// Look `name` up along the enclosing chain.
    pub fn get(&self, name: &Token) -> Result<Value> {
        if let Some(value) = self.values.get(&name.lexeme) {
            Ok(value.clone())
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow().get(name)
        } else {
            Err(undefined(name))
        }
    }

    /// Overwrite an existing binding along the enclosing chain.
    pub fn assign(&mut self, name: &Token, value: Value) -> Result<()> {
        if let Some(slot) = self.values.get_mut(&name.lexeme) {
            *slot = value;
            Ok(())
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow_mut().assign(name, value)
        } else {
            Err(undefined(name))
        }
    }
}

/// Walk `distance` hops up the chain starting at `env`.
pub fn ancestor(env: &EnvRef, distance: usize) -> Option<EnvRef> {
    let mut current: EnvRef = Rc::clone(env);

    for _ in 0..distance {
        let next: EnvRef = current.borrow().enclosing()?;
        current = next;
    }

    Some(current)
}

/// Fetch `name` from the frame exactly `distance` hops up.
pub fn get_at(env: &EnvRef, distance: usize, name: &Token) -> Result<Value> {
    let frame: EnvRef = ancestor(env, distance).ok_or_else(|| undefined(name))?;
    let value: Option<Value> = frame.borrow().get_here(&name.lexeme);

    value.ok_or_else(|| undefined(name))
}

/// Overwrite `name` in the frame exactly `distance` hops up.
pub fn assign_at(env: &EnvRef, distance: usize, name: &Token, value: Value) -> Result<()> {
    let frame: EnvRef = ancestor(env, distance).ok_or_else(|| undefined(name))?;
    let mut frame = frame.borrow_mut();

    match frame.values.get_mut(&name.lexeme) {
        Some(slot) => {
            *slot = value;
            Ok(())
        }
        None => Err(undefined(name)),
    }
}

fn undefined(name: &Token) -> LoxError {
    LoxError::runtime(name, format!("Undefined variable '{}'.", name.lexeme))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::TokenType;

    fn ident(name: &str) -> Token {
        Token::new(TokenType::IDENTIFIER, name, 1)
    }

    #[test]
    fn test_global() {
        let mut env = Environment::new();
        env.define("a", Value::Number(1.0));
        env.define("b", Value::Number(2.0));

        assert_eq!(env.get(&ident("a")).ok(), Some(Value::Number(1.0)));
        assert_eq!(env.get(&ident("b")).ok(), Some(Value::Number(2.0)));
        assert!(env.get(&ident("c")).is_err());
    }

    #[test]
    fn test_scoped() {
        let global: EnvRef = Environment::new().into_ref();
        global.borrow_mut().define("a", Value::Number(1.0));
        global.borrow_mut().define("b", Value::Number(2.0));

        let env: EnvRef = Environment::with_enclosing(global.clone()).into_ref();
        assert_eq!(env.borrow().get(&ident("a")).ok(), Some(Value::Number(1.0)));

        env.borrow_mut().define("a", Value::Number(3.0));
        env.borrow_mut().define("c", Value::Number(4.0));

        assert_eq!(global.borrow().get(&ident("a")).ok(), Some(Value::Number(1.0)));
        assert_eq!(env.borrow().get(&ident("a")).ok(), Some(Value::Number(3.0)));
        assert_eq!(env.borrow().get(&ident("b")).ok(), Some(Value::Number(2.0)));
        assert_eq!(env.borrow().get(&ident("c")).ok(), Some(Value::Number(4.0)));
        assert!(env.borrow().get(&ident("d")).is_err());
    }

    #[test]
    fn test_assign_walks_chain() {
        let global: EnvRef = Environment::new().into_ref();
        global.borrow_mut().define("a", Value::Number(1.0));
        let env: EnvRef = Environment::with_enclosing(global.clone()).into_ref();

        env.borrow_mut()
            .assign(&ident("a"), Value::Bool(true))
            .expect("a is defined globally");

        assert_eq!(global.borrow().get_here("a"), Some(Value::Bool(true)));
        assert!(env.borrow_mut().assign(&ident("zzz"), Value::Nil).is_err());
    }

    #[test]
    fn test_distance_lookup() {
        let global: EnvRef = Environment::new().into_ref();
        global.borrow_mut().define("x", Value::String("global".into()));
        let middle: EnvRef = Environment::with_enclosing(global.clone()).into_ref();
        middle.borrow_mut().define("x", Value::String("middle".into()));
        let inner: EnvRef = Environment::with_enclosing(middle.clone()).into_ref();

        assert_eq!(
            get_at(&inner, 1, &ident("x")).ok(),
            Some(Value::String("middle".into()))
        );
        assert_eq!(
            get_at(&inner, 2, &ident("x")).ok(),
            Some(Value::String("global".into()))
        );
        assert!(get_at(&inner, 0, &ident("x")).is_err());

        assign_at(&inner, 2, &ident("x"), Value::Nil).expect("x exists two hops up");
        assert_eq!(global.borrow().get_here("x"), Some(Value::Nil));
        assert_eq!(middle.borrow().get_here("x"), Some(Value::String("middle".into())));
    }
}
