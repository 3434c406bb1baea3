//! Circuit text parsing
//!
//! [`QasmParser`] accepts the OpenQASM 2/3 subset needed for gate-level
//! circuits: headers, `include`, quantum and classical register
//! declarations, gate statements with parameter expressions, register
//! broadcast, `measure` in both syntaxes, `barrier`, and comments.
//!
//! Gate identifiers are not resolved here. The simulator rejects unknown
//! gates before execution.

use crate::error::{Result, SimulationError};
use qnex_core::{Circuit, Instruction};
use std::collections::HashMap;
use std::f64::consts::PI;

/// Produces a [`Circuit`] from source text
pub trait CircuitParser: Send + Sync {
    /// # Errors
    /// Returns [`SimulationError::CircuitParse`] with the 1-based line number
    fn parse(&self, source: &str) -> Result<Circuit>;
}

/// OpenQASM 2/3 subset parser
///
/// # Example
/// ```
/// use qnex_sim::parser::{CircuitParser, QasmParser};
///
/// let source = r#"
///     OPENQASM 2.0;
///     include "qelib1.inc";
///     qreg q[2];
///     creg c[2];
///     h q[0];
///     cx q[0], q[1];
///     measure q -> c;
/// "#;
/// let circuit = QasmParser::new().parse(source).unwrap();
/// assert_eq!(circuit.num_qubits(), 2);
/// assert_eq!(circuit.len(), 4);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct QasmParser;

impl QasmParser {
    pub fn new() -> Self {
        Self
    }
}

#[derive(Debug, Clone, Copy)]
struct Register {
    offset: usize,
    size: usize,
}

#[derive(Default)]
struct ParseState {
    qregs: HashMap<String, Register>,
    cregs: HashMap<String, usize>,
    num_qubits: usize,
    pending: Vec<Instruction>,
}

impl CircuitParser for QasmParser {
    fn parse(&self, source: &str) -> Result<Circuit> {
        let mut state = ParseState::default();

        for (line, statement) in statements(&strip_comments(source)) {
            parse_statement(&mut state, line, &statement)?;
        }

        if state.num_qubits == 0 {
            return Err(SimulationError::parse(1, "no quantum register declared"));
        }

        let mut circuit = Circuit::with_capacity(state.num_qubits, state.pending.len())?;
        for inst in state.pending {
            circuit.push(inst)?;
        }
        Ok(circuit)
    }
}

/// Replace comments with spaces, keeping newlines so line numbers survive
fn strip_comments(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut chars = source.chars().peekable();
    while let Some(ch) = chars.next() {
        match (ch, chars.peek().copied()) {
            ('/', Some('/')) => {
                for next in chars.by_ref() {
                    if next == '\n' {
                        out.push('\n');
                        break;
                    }
                }
            }
            ('/', Some('*')) => {
                chars.next();
                let mut prev = '\0';
                for next in chars.by_ref() {
                    if next == '\n' {
                        out.push('\n');
                    }
                    if prev == '*' && next == '/' {
                        break;
                    }
                    prev = next;
                }
                out.push(' ');
            }
            _ => out.push(ch),
        }
    }
    out
}

/// Split on `;`, tagging each statement with the line it starts on
fn statements(source: &str) -> Vec<(usize, String)> {
    let mut result = Vec::new();
    let mut current = String::new();
    let mut line = 1;
    let mut start_line = 1;

    for ch in source.chars() {
        if current.trim().is_empty() {
            start_line = line;
        }
        match ch {
            ';' => {
                let text = current.trim();
                if !text.is_empty() {
                    result.push((start_line, text.to_string()));
                }
                current.clear();
            }
            '\n' => {
                line += 1;
                current.push(' ');
            }
            _ => current.push(ch),
        }
    }

    let rest = current.trim();
    if !rest.is_empty() {
        // Missing final semicolon is reported by the caller
        result.push((start_line, format!("{}\0", rest)));
    }
    result
}

fn parse_statement(state: &mut ParseState, line: usize, statement: &str) -> Result<()> {
    if let Some(body) = statement.strip_suffix('\0') {
        return Err(SimulationError::parse(
            line,
            format!("expected ';' after '{}'", body),
        ));
    }

    let (keyword, rest) = split_keyword(statement);
    match keyword {
        "OPENQASM" | "include" => Ok(()),
        "qreg" => {
            let (name, size) = parse_indexed_decl(line, rest)?;
            declare_qreg(state, line, name, size)
        }
        "creg" => {
            let (name, size) = parse_indexed_decl(line, rest)?;
            state.cregs.insert(name.to_string(), size);
            Ok(())
        }
        "qubit" => {
            let (name, size) = parse_typed_decl(line, statement, "qubit")?;
            declare_qreg(state, line, name, size)
        }
        "bit" => {
            let (name, size) = parse_typed_decl(line, statement, "bit")?;
            state.cregs.insert(name.to_string(), size);
            Ok(())
        }
        "measure" => {
            let target = rest.split("->").next().unwrap_or("");
            push_measure(state, line, target)
        }
        "barrier" => {
            let mut qubits = Vec::new();
            for arg in split_top_level(rest) {
                qubits.extend(resolve_qubits(state, line, &arg)?);
            }
            if qubits.is_empty() {
                qubits = (0..state.num_qubits).collect();
            }
            state.pending.push(Instruction::new("barrier", &qubits, &[]));
            Ok(())
        }
        "gate" | "def" | "opaque" | "if" | "for" | "while" => Err(SimulationError::parse(
            line,
            format!("'{}' blocks are not supported", keyword),
        )),
        _ => {
            if let Some((_, rhs)) = statement.split_once('=') {
                let rhs = rhs.trim();
                if let Some(target) = rhs.strip_prefix("measure") {
                    return push_measure(state, line, target);
                }
                return Err(SimulationError::parse(line, "unsupported assignment"));
            }
            parse_gate(state, line, statement)
        }
    }
}

fn split_keyword(statement: &str) -> (&str, &str) {
    let end = statement
        .find(|c: char| c.is_whitespace() || c == '(' || c == '[')
        .unwrap_or(statement.len());
    let keyword = &statement[..end];
    let rest = statement[end..].trim_start();
    (keyword, rest)
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn declare_qreg(state: &mut ParseState, line: usize, name: &str, size: usize) -> Result<()> {
    if size == 0 {
        return Err(SimulationError::parse(line, format!("register '{}' has size 0", name)));
    }
    if state.qregs.contains_key(name) {
        return Err(SimulationError::parse(
            line,
            format!("register '{}' declared twice", name),
        ));
    }
    state.qregs.insert(
        name.to_string(),
        Register {
            offset: state.num_qubits,
            size,
        },
    );
    state.num_qubits += size;
    Ok(())
}

/// `name[size]`
fn parse_indexed_decl(line: usize, text: &str) -> Result<(&str, usize)> {
    let text = text.trim();
    let (name, index) = match text.split_once('[') {
        Some((name, rest)) => {
            let index = rest
                .strip_suffix(']')
                .ok_or_else(|| SimulationError::parse(line, format!("missing ']' in '{}'", text)))?;
            (name.trim(), parse_usize(line, index)?)
        }
        None => (text, 1),
    };
    if !is_identifier(name) {
        return Err(SimulationError::parse(line, format!("invalid register name '{}'", name)));
    }
    Ok((name, index))
}

/// `qubit[size] name` or `qubit name`
fn parse_typed_decl<'s>(line: usize, statement: &'s str, ty: &str) -> Result<(&'s str, usize)> {
    let rest = statement[ty.len()..].trim_start();
    let (size, name) = match rest.strip_prefix('[') {
        Some(rest) => {
            let (size, name) = rest
                .split_once(']')
                .ok_or_else(|| SimulationError::parse(line, "missing ']' in declaration"))?;
            (parse_usize(line, size)?, name.trim())
        }
        None => (1, rest.trim()),
    };
    if !is_identifier(name) {
        return Err(SimulationError::parse(line, format!("invalid register name '{}'", name)));
    }
    Ok((name, size))
}

fn parse_usize(line: usize, text: &str) -> Result<usize> {
    text.trim()
        .parse::<usize>()
        .map_err(|_| SimulationError::parse(line, format!("expected an index, found '{}'", text.trim())))
}

/// `name` (whole register) or `name[i]`
fn resolve_qubits(state: &ParseState, line: usize, arg: &str) -> Result<Vec<usize>> {
    let arg = arg.trim();
    let (name, index) = match arg.split_once('[') {
        Some((name, rest)) => {
            let index = rest
                .strip_suffix(']')
                .ok_or_else(|| SimulationError::parse(line, format!("missing ']' in '{}'", arg)))?;
            (name.trim(), Some(parse_usize(line, index)?))
        }
        None => (arg, None),
    };

    let register = state
        .qregs
        .get(name)
        .ok_or_else(|| SimulationError::parse(line, format!("unknown quantum register '{}'", name)))?;

    match index {
        Some(i) if i >= register.size => Err(SimulationError::parse(
            line,
            format!("index {} out of range for '{}[{}]'", i, name, register.size),
        )),
        Some(i) => Ok(vec![register.offset + i]),
        None => Ok((register.offset..register.offset + register.size).collect()),
    }
}

fn push_measure(state: &mut ParseState, line: usize, target: &str) -> Result<()> {
    let target = target.trim();
    if target.is_empty() {
        return Err(SimulationError::parse(line, "measure needs a qubit operand"));
    }
    for q in resolve_qubits(state, line, target)? {
        state.pending.push(Instruction::new("measure", &[q], &[]));
    }
    Ok(())
}

fn canonical_gate_name(name: &str) -> &str {
    match name {
        "CX" | "cnot" => "cx",
        "U" | "u" => "u3",
        "p" | "phase" => "u1",
        "i" => "id",
        "toffoli" => "ccx",
        other => other,
    }
}

fn parse_gate(state: &mut ParseState, line: usize, statement: &str) -> Result<()> {
    let name_end = statement
        .find(|c: char| c.is_whitespace() || c == '(')
        .unwrap_or(statement.len());
    let name = &statement[..name_end];
    if !is_identifier(name) {
        return Err(SimulationError::parse(line, format!("unexpected '{}'", statement)));
    }
    let mut rest = statement[name_end..].trim_start();

    let mut params = Vec::new();
    if rest.starts_with('(') {
        let close = matching_paren(rest)
            .ok_or_else(|| SimulationError::parse(line, "unbalanced parentheses"))?;
        for expr in split_top_level(&rest[1..close]) {
            let value = evaluate(&expr).map_err(|msg| SimulationError::parse(line, msg))?;
            params.push(value);
        }
        rest = rest[close + 1..].trim_start();
    }

    let operands: Vec<Vec<usize>> = split_top_level(rest)
        .iter()
        .map(|arg| resolve_qubits(state, line, arg))
        .collect::<Result<_>>()?;
    if operands.is_empty() {
        return Err(SimulationError::parse(line, format!("gate '{}' has no operands", name)));
    }

    // Register broadcast: every whole-register operand must have the same size
    let width = operands.iter().map(Vec::len).max().unwrap_or(1);
    if operands.iter().any(|o| o.len() != 1 && o.len() != width) {
        return Err(SimulationError::parse(
            line,
            format!("register sizes differ in broadcast of '{}'", name),
        ));
    }

    let gate_id = canonical_gate_name(name);
    for i in 0..width {
        let qubits: Vec<usize> = operands
            .iter()
            .map(|o| if o.len() == 1 { o[0] } else { o[i] })
            .collect();
        state.pending.push(Instruction::new(gate_id, &qubits, &params));
    }
    Ok(())
}

fn matching_paren(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    for (i, ch) in text.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Split on commas outside parentheses and brackets
fn split_top_level(text: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut current = String::new();
    for ch in text.chars() {
        match ch {
            '(' | '[' => depth += 1,
            ')' | ']' => depth -= 1,
            _ => {}
        }
        if ch == ',' && depth == 0 {
            parts.push(current.trim().to_string());
            current.clear();
        } else {
            current.push(ch);
        }
    }
    if !current.trim().is_empty() {
        parts.push(current.trim().to_string());
    }
    parts
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Ident(String),
    Op(char),
    Open,
    Close,
}

fn tokenize(text: &str) -> std::result::Result<Vec<Token>, String> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = text.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        let ch = chars[i];
        if ch.is_whitespace() {
            i += 1;
        } else if ch.is_ascii_digit() || ch == '.' {
            let start = i;
            while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                i += 1;
            }
            if i < chars.len() && (chars[i] == 'e' || chars[i] == 'E') {
                let mut j = i + 1;
                if j < chars.len() && (chars[j] == '+' || chars[j] == '-') {
                    j += 1;
                }
                if j < chars.len() && chars[j].is_ascii_digit() {
                    i = j;
                    while i < chars.len() && chars[i].is_ascii_digit() {
                        i += 1;
                    }
                }
            }
            let literal: String = chars[start..i].iter().collect();
            let value = literal
                .parse::<f64>()
                .map_err(|_| format!("invalid number '{}'", literal))?;
            tokens.push(Token::Number(value));
        } else if ch.is_alphabetic() || ch == '_' {
            let start = i;
            while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
                i += 1;
            }
            tokens.push(Token::Ident(chars[start..i].iter().collect()));
        } else {
            match ch {
                '+' | '-' | '*' | '/' | '^' => tokens.push(Token::Op(ch)),
                '(' => tokens.push(Token::Open),
                ')' => tokens.push(Token::Close),
                other => return Err(format!("unexpected character '{}' in expression", other)),
            }
            i += 1;
        }
    }
    Ok(tokens)
}

/// Evaluate a parameter expression such as `pi/2` or `-3*pi/4 + 0.1`
fn evaluate(text: &str) -> std::result::Result<f64, String> {
    let tokens = tokenize(text)?;
    if tokens.is_empty() {
        return Err("empty parameter expression".to_string());
    }
    let mut parser = ExprParser { tokens, pos: 0 };
    let value = parser.expression()?;
    if parser.pos != parser.tokens.len() {
        return Err(format!("unexpected trailing input in '{}'", text));
    }
    if !value.is_finite() {
        return Err(format!("expression '{}' is not finite", text));
    }
    Ok(value)
}

struct ExprParser {
    tokens: Vec<Token>,
    pos: usize,
}

impl ExprParser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn expression(&mut self) -> std::result::Result<f64, String> {
        let mut value = self.term()?;
        while let Some(Token::Op(op @ ('+' | '-'))) = self.peek().cloned() {
            self.pos += 1;
            let rhs = self.term()?;
            value = if op == '+' { value + rhs } else { value - rhs };
        }
        Ok(value)
    }

    fn term(&mut self) -> std::result::Result<f64, String> {
        let mut value = self.unary()?;
        while let Some(Token::Op(op @ ('*' | '/'))) = self.peek().cloned() {
            self.pos += 1;
            let rhs = self.unary()?;
            value = if op == '*' { value * rhs } else { value / rhs };
        }
        Ok(value)
    }

    fn unary(&mut self) -> std::result::Result<f64, String> {
        match self.peek() {
            Some(Token::Op('-')) => {
                self.pos += 1;
                Ok(-self.unary()?)
            }
            Some(Token::Op('+')) => {
                self.pos += 1;
                self.unary()
            }
            _ => self.power(),
        }
    }

    fn power(&mut self) -> std::result::Result<f64, String> {
        let base = self.atom()?;
        if let Some(Token::Op('^')) = self.peek() {
            self.pos += 1;
            let exponent = self.unary()?;
            return Ok(base.powf(exponent));
        }
        Ok(base)
    }

    fn atom(&mut self) -> std::result::Result<f64, String> {
        match self.next() {
            Some(Token::Number(value)) => Ok(value),
            Some(Token::Open) => {
                let value = self.expression()?;
                match self.next() {
                    Some(Token::Close) => Ok(value),
                    _ => Err("expected ')'".to_string()),
                }
            }
            Some(Token::Ident(name)) => match name.as_str() {
                "pi" | "π" => Ok(PI),
                "tau" | "τ" => Ok(2.0 * PI),
                "sin" | "cos" | "tan" | "exp" | "ln" | "sqrt" => {
                    if self.next() != Some(Token::Open) {
                        return Err(format!("expected '(' after '{}'", name));
                    }
                    let arg = self.expression()?;
                    if self.next() != Some(Token::Close) {
                        return Err(format!("expected ')' to close '{}'", name));
                    }
                    Ok(match name.as_str() {
                        "sin" => arg.sin(),
                        "cos" => arg.cos(),
                        "tan" => arg.tan(),
                        "exp" => arg.exp(),
                        "ln" => arg.ln(),
                        _ => arg.sqrt(),
                    })
                }
                other => Err(format!("unknown identifier '{}' in expression", other)),
            },
            Some(token) => Err(format!("unexpected {:?} in expression", token)),
            None => Err("unexpected end of expression".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn parse(source: &str) -> Result<Circuit> {
        QasmParser::new().parse(source)
    }

    fn ops(circuit: &Circuit) -> Vec<String> {
        circuit.instructions().map(|i| i.to_string()).collect()
    }

    #[test]
    fn test_qasm2_program() {
        let circuit = parse(
            "OPENQASM 2.0;\ninclude \"qelib1.inc\";\nqreg q[3];\ncreg c[3];\n\
             h q[0];\ncx q[0],q[1];\nccx q[0], q[1], q[2];\nmeasure q[2] -> c[2];\n",
        )
        .unwrap();
        assert_eq!(circuit.num_qubits(), 3);
        assert_eq!(ops(&circuit), vec!["h q0", "cx q0, q1", "ccx q0, q1, q2", "measure q2"]);
    }

    #[test]
    fn test_qasm3_declarations_and_measure() {
        let circuit = parse(
            "OPENQASM 3.0;\ninclude \"stdgates.inc\";\nqubit[2] q;\nbit[2] c;\n\
             x q[1];\nc[1] = measure q[1];\nc = measure q;\n",
        )
        .unwrap();
        assert_eq!(ops(&circuit), vec!["x q1", "measure q1", "measure q0", "measure q1"]);
    }

    #[test]
    fn test_multiple_registers_are_concatenated() {
        let circuit = parse("qreg a[2]; qreg b[1]; cx a[1], b[0];").unwrap();
        assert_eq!(circuit.num_qubits(), 3);
        assert_eq!(ops(&circuit), vec!["cx q1, q2"]);
    }

    #[test]
    fn test_broadcast() {
        let circuit = parse("qreg q[2]; qreg r[2]; h q; cx q, r; cx q[0], r;").unwrap();
        assert_eq!(
            ops(&circuit),
            vec!["h q0", "h q1", "cx q0, q2", "cx q1, q3", "cx q0, q2", "cx q0, q3"]
        );
        assert!(parse("qreg q[2]; qreg r[3]; cx q, r;").is_err());
    }

    #[test]
    fn test_parameter_expressions() {
        let circuit = parse("qreg q[1]; rx(pi/2) q[0]; u3(-pi, 2*pi/4, 0.5e-1) q[0]; p(-(pi)) q[0];").unwrap();
        let params: Vec<Vec<f64>> = circuit.instructions().map(|i| i.params().to_vec()).collect();
        assert_relative_eq!(params[0][0], PI / 2.0);
        assert_relative_eq!(params[1][0], -PI);
        assert_relative_eq!(params[1][1], PI / 2.0);
        assert_relative_eq!(params[1][2], 0.05);
        assert_relative_eq!(params[2][0], -PI);
        assert_eq!(circuit.get(2).unwrap().gate_id(), "u1");
    }

    #[test]
    fn test_expression_functions_and_precedence() {
        assert_relative_eq!(evaluate("1 + 2 * 3").unwrap(), 7.0);
        assert_relative_eq!(evaluate("2^3^2").unwrap(), 512.0);
        assert_relative_eq!(evaluate("-2^2").unwrap(), -4.0);
        assert_relative_eq!(evaluate("cos(pi)").unwrap(), -1.0);
        assert_relative_eq!(evaluate("sqrt(4) / 2").unwrap(), 1.0);
        assert!(evaluate("1 +").is_err());
        assert!(evaluate("theta").is_err());
        assert!(evaluate("1/0").is_err());
    }

    #[test]
    fn test_comments_and_line_numbers() {
        let source = "// header\nqreg q[1];\n/* block\n comment */\nh q[0];\nh q[5];\n";
        match parse(source) {
            Err(SimulationError::CircuitParse { line, message }) => {
                assert_eq!(line, 6);
                assert!(message.contains("out of range"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_barrier() {
        let circuit = parse("qreg q[3]; barrier q[0], q[2]; barrier q;").unwrap();
        assert_eq!(ops(&circuit), vec!["barrier q0, q2", "barrier q0, q1, q2"]);
    }

    #[test]
    fn test_unknown_gates_pass_through() {
        let circuit = parse("qreg q[1]; mystery q[0];").unwrap();
        assert_eq!(circuit.get(0).unwrap().gate_id(), "mystery");
    }

    #[test]
    fn test_errors() {
        assert!(matches!(parse("h q[0];"), Err(SimulationError::CircuitParse { .. })));
        assert!(matches!(parse(""), Err(SimulationError::CircuitParse { line: 1, .. })));
        assert!(parse("qreg q[1]; h q[0]").is_err());
        assert!(parse("qreg q[1]; qreg q[2];").is_err());
        assert!(parse("qreg q[1]; gate foo a { x a; }").is_err());
        assert!(parse("qreg q[1]; rx(pi q[0];").is_err());
    }
}
