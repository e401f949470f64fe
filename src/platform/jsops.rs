//! Interpreter for the signature scrambling sublanguage of player scripts.
//!
//! The player script defines a helper object whose methods do one primitive
//! array operation each, and a decoder function that splits the signature
//! into characters, calls helper methods with numeric arguments and joins the
//! result. Both fragments are tokenized, local names are canonicalized
//! (parameters become `a`, `b`, declared locals follow) and every statement is
//! matched against a small set of known shapes. Nothing outside that set is
//! accepted, so no script code is ever evaluated.

use crate::error::InfoError;
use std::collections::HashMap;
use std::sync::LazyLock;
use tracing::debug;

/// Canonical names assigned to parameters and locals in declaration order
const CANONICAL_NAMES: [&str; 6] = ["a", "b", "c", "d", "e", "f"];

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Ident(String),
    Number(String),
    Str(String),
    Punct(char),
}

fn tokenize(source: &str) -> Result<Vec<Token>, InfoError> {
    let chars: Vec<char> = source.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if c.is_whitespace() {
            i += 1;
        } else if c.is_ascii_alphabetic() || c == '_' || c == '$' {
            let start = i;
            while i < chars.len()
                && (chars[i].is_ascii_alphanumeric() || chars[i] == '_' || chars[i] == '$')
            {
                i += 1;
            }
            tokens.push(Token::Ident(chars[start..i].iter().collect()));
        } else if c.is_ascii_digit() {
            let start = i;
            while i < chars.len() && chars[i].is_ascii_digit() {
                i += 1;
            }
            tokens.push(Token::Number(chars[start..i].iter().collect()));
        } else if c == '"' || c == '\'' {
            let mut value = String::new();
            i += 1;
            loop {
                match chars.get(i) {
                    None => {
                        return Err(InfoError::CipherError(
                            "unterminated string literal".to_string(),
                        ))
                    }
                    Some('\\') => {
                        if let Some(escaped) = chars.get(i + 1) {
                            value.push(*escaped);
                        }
                        i += 2;
                    }
                    Some(q) if *q == c => {
                        i += 1;
                        break;
                    }
                    Some(other) => {
                        value.push(*other);
                        i += 1;
                    }
                }
            }
            tokens.push(Token::Str(value));
        } else {
            tokens.push(Token::Punct(c));
            i += 1;
        }
    }

    Ok(tokens)
}

/// Rename parameters and `var` locals to canonical names.
///
/// Identifiers after `.` are property names and keep their spelling.
fn canonicalize(tokens: &[Token], params: &[String]) -> Vec<Token> {
    let mut names: HashMap<String, String> = HashMap::new();
    let mut next = 0;
    let mut assign = |name: &str, names: &mut HashMap<String, String>| {
        if !names.contains_key(name) {
            let canonical = CANONICAL_NAMES
                .get(next)
                .map(|n| n.to_string())
                .unwrap_or_else(|| format!("v{}", next));
            names.insert(name.to_string(), canonical);
            next += 1;
        }
    };

    for param in params {
        assign(param, &mut names);
    }
    for pair in tokens.windows(2) {
        if let [Token::Ident(kw), Token::Ident(local)] = pair {
            if kw == "var" || kw == "let" || kw == "const" {
                assign(local, &mut names);
            }
        }
    }

    tokens
        .iter()
        .enumerate()
        .map(|(i, token)| match token {
            Token::Ident(name) if i == 0 || tokens[i - 1] != Token::Punct('.') => names
                .get(name)
                .map(|n| Token::Ident(n.clone()))
                .unwrap_or_else(|| token.clone()),
            _ => token.clone(),
        })
        .collect()
}

/// Split a token list into top-level `;`-separated statements
fn statements(tokens: &[Token]) -> Vec<&[Token]> {
    let mut result = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;

    for (i, token) in tokens.iter().enumerate() {
        match token {
            Token::Punct('(' | '[' | '{') => depth += 1,
            Token::Punct(')' | ']' | '}') => depth -= 1,
            Token::Punct(';') if depth == 0 => {
                result.push(&tokens[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    result.push(&tokens[start..]);
    result.retain(|s| !s.is_empty());
    result
}

/// Values captured by template placeholders
#[derive(Debug, Default)]
struct Captures {
    idents: Vec<String>,
    numbers: Vec<usize>,
}

/// Tokenized statement shape.
///
/// In templates `@` matches any identifier and `#` any number literal.
#[derive(Debug)]
struct Template(Vec<Token>);

impl Template {
    fn new(source: &str) -> Self {
        // Template sources are fixed literals without string errors
        Self(tokenize(source).unwrap_or_default())
    }

    fn captures(&self, statement: &[Token]) -> Option<Captures> {
        if self.0.is_empty() || self.0.len() != statement.len() {
            return None;
        }

        let mut captures = Captures::default();
        for (expected, actual) in self.0.iter().zip(statement) {
            match (expected, actual) {
                (Token::Punct('@'), Token::Ident(name)) => captures.idents.push(name.clone()),
                (Token::Punct('#'), Token::Number(n)) => captures.numbers.push(n.parse().ok()?),
                _ if expected == actual => {}
                _ => return None,
            }
        }
        Some(captures)
    }

    fn matches(&self, statement: &[Token]) -> bool {
        self.captures(statement).is_some()
    }
}

fn matches_sequence(body: &[&[Token]], templates: &[Template]) -> bool {
    body.len() == templates.len()
        && body
            .iter()
            .zip(templates)
            .all(|(statement, template)| template.matches(statement))
}

/// Primitive operation of a helper method
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HelperOp {
    /// `a.reverse()`
    Reverse,
    /// `a.splice(0,b)`
    Splice,
    /// Exchange `a[0]` and `a[b % a.length]`
    Swap,
}

/// Known helper method bodies, canonicalized
const HELPER_SHAPE_SOURCES: [(HelperOp, &[&str]); 5] = [
    (HelperOp::Reverse, &["a.reverse()"]),
    (HelperOp::Splice, &["a.splice(0,b)"]),
    (
        HelperOp::Swap,
        &["var c=a[0]", "a[0]=a[b%a.length]", "a[b%a.length]=c"],
    ),
    (HelperOp::Swap, &["var c=a[0]", "a[0]=a[b%a.length]", "a[b]=c"]),
    (HelperOp::Swap, &["a.splice(0,1,a.splice(b,1,a[0])[0])"]),
];

static HELPER_SHAPES: LazyLock<Vec<(HelperOp, Vec<Template>)>> = LazyLock::new(|| {
    HELPER_SHAPE_SOURCES
        .iter()
        .map(|(op, sources)| (*op, sources.iter().map(|s| Template::new(s)).collect()))
        .collect()
});

/// Statement shapes accepted in a decoder body, canonicalized
struct DecoderShapes {
    split: Template,
    join: Template,
    helper_call: Template,
    helper_call_no_arg: Template,
    reverse: Template,
    splice: Template,
    slice: Template,
}

static DECODER_SHAPES: LazyLock<DecoderShapes> = LazyLock::new(|| DecoderShapes {
    split: Template::new(r#"a=a.split("")"#),
    join: Template::new(r#"return a.join("")"#),
    helper_call: Template::new("@.@(a,#)"),
    helper_call_no_arg: Template::new("@.@(a)"),
    reverse: Template::new("a.reverse()"),
    splice: Template::new("a.splice(0,#)"),
    slice: Template::new("a=a.slice(#)"),
});

fn classify_helper(params: &[String], body: &[Token]) -> Option<HelperOp> {
    let canonical = canonicalize(body, params);
    let body = statements(&canonical);
    HELPER_SHAPES
        .iter()
        .find(|(_, shape)| matches_sequence(&body, shape))
        .map(|(op, _)| *op)
}

/// Cursor over a token list used for the two literal forms we parse
struct Cursor<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(tokens: &'a [Token]) -> Self {
        Self { tokens, pos: 0 }
    }

    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<&'a Token> {
        let token = self.tokens.get(self.pos);
        self.pos += 1;
        token
    }

    fn expect(&mut self, punct: char) -> Result<(), InfoError> {
        match self.next() {
            Some(Token::Punct(c)) if *c == punct => Ok(()),
            other => Err(InfoError::CipherError(format!(
                "expected '{}', found {:?}",
                punct, other
            ))),
        }
    }

    fn keyword(&mut self, word: &str) -> Result<(), InfoError> {
        match self.next() {
            Some(Token::Ident(w)) if w == word => Ok(()),
            other => Err(InfoError::CipherError(format!(
                "expected '{}', found {:?}",
                word, other
            ))),
        }
    }

    /// `(p1,p2,...)`
    fn params(&mut self) -> Result<Vec<String>, InfoError> {
        self.expect('(')?;
        let mut params = Vec::new();
        loop {
            match self.next() {
                Some(Token::Punct(')')) => return Ok(params),
                Some(Token::Punct(',')) => {}
                Some(Token::Ident(name)) => params.push(name.clone()),
                other => {
                    return Err(InfoError::CipherError(format!(
                        "unexpected token in parameter list: {:?}",
                        other
                    )))
                }
            }
        }
    }

    /// `{...}`, returning the tokens between the braces
    fn block(&mut self) -> Result<&'a [Token], InfoError> {
        self.expect('{')?;
        let start = self.pos;
        let mut depth = 1;
        while let Some(token) = self.next() {
            match token {
                Token::Punct('{') => depth += 1,
                Token::Punct('}') => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(&self.tokens[start..self.pos - 1]);
                    }
                }
                _ => {}
            }
        }
        Err(InfoError::CipherError("unterminated block".to_string()))
    }

    /// `function [name](params){body}`
    fn function(&mut self) -> Result<(Vec<String>, &'a [Token]), InfoError> {
        self.keyword("function")?;
        if let Some(Token::Ident(_)) = self.peek() {
            self.pos += 1;
        }
        let params = self.params()?;
        let body = self.block()?;
        Ok((params, body))
    }
}

/// Helper object methods that map onto a known primitive
#[derive(Debug, Clone, Default)]
pub struct HelperObject {
    methods: HashMap<String, HelperOp>,
}

impl HelperObject {
    /// Parse an object literal `{name:function(a,b){...},...}`.
    ///
    /// Methods with unrecognized bodies are skipped; calling one from the
    /// decoder is rejected at compile time.
    pub fn parse(source: &str) -> Result<Self, InfoError> {
        let tokens = tokenize(source)?;
        let mut cursor = Cursor::new(&tokens);
        let mut methods = HashMap::new();

        cursor.expect('{')?;
        loop {
            let name = match cursor.next() {
                Some(Token::Punct('}')) => break,
                Some(Token::Punct(',')) => continue,
                Some(Token::Ident(name)) | Some(Token::Str(name)) => name.clone(),
                other => {
                    return Err(InfoError::CipherError(format!(
                        "unexpected token in helper object: {:?}",
                        other
                    )))
                }
            };
            cursor.expect(':')?;
            let (params, body) = cursor.function()?;

            match classify_helper(&params, body) {
                Some(op) => {
                    debug!("Helper method {} -> {:?}", name, op);
                    methods.insert(name, op);
                }
                None => debug!("Helper method {} has an unknown shape", name),
            }
        }

        Ok(Self { methods })
    }

    /// Look up the primitive behind a method name
    pub fn op(&self, method: &str) -> Option<HelperOp> {
        self.methods.get(method).copied()
    }

}

/// One step of a compiled signature program
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Reverse,
    /// Drop the first `n` characters
    Splice(usize),
    /// Exchange the first character with the one at `n % len`
    Swap(usize),
    /// Keep the characters from `n` on
    Slice(usize),
}

impl Op {
    fn apply(&self, chars: &mut Vec<char>) {
        match *self {
            Op::Reverse => chars.reverse(),
            Op::Splice(n) | Op::Slice(n) => {
                chars.drain(..n.min(chars.len()));
            }
            Op::Swap(n) => {
                if !chars.is_empty() {
                    let idx = n % chars.len();
                    chars.swap(0, idx);
                }
            }
        }
    }
}

/// Compiled signature transformation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureProgram {
    ops: Vec<Op>,
}

impl SignatureProgram {
    /// Compile a decoder function literal against its helper object.
    ///
    /// `function_source` is `function(a){a=a.split("");...;return a.join("")}`,
    /// `helper_name` the identifier the body calls methods on and
    /// `helper_source` that object's literal.
    pub fn compile(
        function_source: &str,
        helper_name: &str,
        helper_source: &str,
    ) -> Result<Self, InfoError> {
        let helper = HelperObject::parse(helper_source)?;
        let tokens = tokenize(function_source)?;
        let (params, body) = Cursor::new(&tokens).function()?;
        if params.len() != 1 {
            return Err(InfoError::CipherError(format!(
                "decoder takes {} parameters",
                params.len()
            )));
        }

        let canonical = canonicalize(body, &params);
        let body = statements(&canonical);
        let (first, rest) = body
            .split_first()
            .ok_or_else(|| InfoError::CipherError("empty decoder body".to_string()))?;
        let (last, middle) = rest
            .split_last()
            .ok_or_else(|| InfoError::CipherError("decoder body too short".to_string()))?;

        let shapes = &*DECODER_SHAPES;
        if !shapes.split.matches(first) {
            return Err(InfoError::CipherError(
                "decoder does not start with split".to_string(),
            ));
        }
        if !shapes.join.matches(last) {
            return Err(InfoError::CipherError(
                "decoder does not end with join".to_string(),
            ));
        }

        let ops = middle
            .iter()
            .map(|statement| compile_statement(statement, helper_name, &helper))
            .collect::<Result<Vec<_>, _>>()?;
        debug!("Compiled signature program with {} steps", ops.len());

        Ok(Self { ops })
    }

    /// Build a program directly from steps
    pub fn from_ops(ops: Vec<Op>) -> Self {
        Self { ops }
    }

    /// Steps in execution order
    pub fn ops(&self) -> &[Op] {
        &self.ops
    }

    /// Run the program on a scrambled signature
    pub fn run(&self, input: &str) -> String {
        let mut chars: Vec<char> = input.chars().collect();
        for op in &self.ops {
            op.apply(&mut chars);
        }
        chars.into_iter().collect()
    }
}

fn compile_statement(
    statement: &[Token],
    helper_name: &str,
    helper: &HelperObject,
) -> Result<Op, InfoError> {
    let shapes = &*DECODER_SHAPES;
    let call = shapes
        .helper_call
        .captures(statement)
        .or_else(|| shapes.helper_call_no_arg.captures(statement));
    if let Some(captures) = call {
        let (object, method) = (&captures.idents[0], &captures.idents[1]);
        if object != helper_name {
            return Err(InfoError::CipherError(format!(
                "call on unexpected object {}",
                object
            )));
        }
        let arg = captures.numbers.first().copied().unwrap_or(0);
        return match helper.op(method) {
            Some(HelperOp::Reverse) => Ok(Op::Reverse),
            Some(HelperOp::Splice) => Ok(Op::Splice(arg)),
            Some(HelperOp::Swap) => Ok(Op::Swap(arg)),
            None => Err(InfoError::CipherError(format!(
                "unsupported helper method {}.{}",
                object, method
            ))),
        };
    }

    if shapes.reverse.matches(statement) {
        return Ok(Op::Reverse);
    }
    if let Some(captures) = shapes.splice.captures(statement) {
        return Ok(Op::Splice(captures.numbers[0]));
    }
    if let Some(captures) = shapes.slice.captures(statement) {
        return Ok(Op::Slice(captures.numbers[0]));
    }

    Err(InfoError::CipherError(format!(
        "unsupported decoder statement: {:?}",
        statement
    )))
}
