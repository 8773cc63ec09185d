/// GLSL subset front end - tokenizer, parser, validator and evaluator
///
/// Accepts the slice of GLSL the tutorial shaders are written in: a
/// `#version` directive, global `in`/`out`/`uniform` declarations of
/// `float`/`vec2`/`vec3`/`vec4` (with an optional `layout(location = N)`),
/// and a `void main()` whose body is a sequence of assignments built from
/// literals, identifiers, swizzles, constructors, unary minus and
/// parentheses. Everything accepted is executed; everything else is a
/// CompileError with a GL-style `0:<line>:` prefix.

use glam::{Vec2, Vec3, Vec4};
use rustc_hash::FxHashMap;

use lumiere_engine::lumiere::{Error, Result};
use lumiere_engine::lumiere::render::ShaderStage;

/// GLSL versions the directive accepts
pub const KNOWN_VERSIONS: [u32; 13] = [
    110, 120, 130, 140, 150, 330, 400, 410, 420, 430, 440, 450, 460,
];

fn compile_error(stage: ShaderStage, line: u32, message: impl AsRef<str>) -> Error {
    Error::CompileError {
        stage,
        message: format!("0:{}: {}", line, message.as_ref()),
    }
}

// ============================================================================
// Types and values
// ============================================================================

/// Data types of the subset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlslType {
    Float,
    Vec2,
    Vec3,
    Vec4,
}

impl GlslType {
    /// Number of float components
    pub fn components(self) -> usize {
        match self {
            GlslType::Float => 1,
            GlslType::Vec2 => 2,
            GlslType::Vec3 => 3,
            GlslType::Vec4 => 4,
        }
    }

    /// GLSL spelling of the type
    pub fn name(self) -> &'static str {
        match self {
            GlslType::Float => "float",
            GlslType::Vec2 => "vec2",
            GlslType::Vec3 => "vec3",
            GlslType::Vec4 => "vec4",
        }
    }

    fn parse(word: &str) -> Option<GlslType> {
        match word {
            "float" => Some(GlslType::Float),
            "vec2" => Some(GlslType::Vec2),
            "vec3" => Some(GlslType::Vec3),
            "vec4" => Some(GlslType::Vec4),
            _ => None,
        }
    }

    fn from_components(count: usize) -> GlslType {
        match count {
            1 => GlslType::Float,
            2 => GlslType::Vec2,
            3 => GlslType::Vec3,
            _ => GlslType::Vec4,
        }
    }
}

/// A runtime value of one of the subset's types
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    Float(f32),
    Vec2(Vec2),
    Vec3(Vec3),
    Vec4(Vec4),
}

impl Value {
    /// The type of this value
    pub fn ty(&self) -> GlslType {
        match self {
            Value::Float(_) => GlslType::Float,
            Value::Vec2(_) => GlslType::Vec2,
            Value::Vec3(_) => GlslType::Vec3,
            Value::Vec4(_) => GlslType::Vec4,
        }
    }

    /// The zero value of a type (GL default for unset uniforms)
    pub fn zero(ty: GlslType) -> Value {
        match ty {
            GlslType::Float => Value::Float(0.0),
            GlslType::Vec2 => Value::Vec2(Vec2::ZERO),
            GlslType::Vec3 => Value::Vec3(Vec3::ZERO),
            GlslType::Vec4 => Value::Vec4(Vec4::ZERO),
        }
    }

    /// Components as a fixed array; unused slots are zero
    pub fn to_array(self) -> [f32; 4] {
        match self {
            Value::Float(x) => [x, 0.0, 0.0, 0.0],
            Value::Vec2(v) => [v.x, v.y, 0.0, 0.0],
            Value::Vec3(v) => [v.x, v.y, v.z, 0.0],
            Value::Vec4(v) => v.to_array(),
        }
    }

    /// Build a value from the first `count` components of `parts`
    pub fn from_components(parts: &[f32]) -> Value {
        match parts.len() {
            1 => Value::Float(parts[0]),
            2 => Value::Vec2(Vec2::new(parts[0], parts[1])),
            3 => Value::Vec3(Vec3::new(parts[0], parts[1], parts[2])),
            _ => Value::Vec4(Vec4::new(parts[0], parts[1], parts[2], parts[3])),
        }
    }

    /// The value as a vec4, zero-extended (positions and colors are vec4)
    pub fn to_vec4(self) -> Vec4 {
        Vec4::from_array(self.to_array())
    }
}

/// Expand a 2-component vertex attribute to the declared input type
///
/// Follows the GL attribute expansion rule: missing z reads 0, missing w
/// reads 1.
pub fn expand_attribute(position: Vec2, ty: GlslType) -> Value {
    match ty {
        GlslType::Float => Value::Float(position.x),
        GlslType::Vec2 => Value::Vec2(position),
        GlslType::Vec3 => Value::Vec3(Vec3::new(position.x, position.y, 0.0)),
        GlslType::Vec4 => Value::Vec4(Vec4::new(position.x, position.y, 0.0, 1.0)),
    }
}

// ============================================================================
// Declarations and the compiled module
// ============================================================================

/// A global `in`, `out` or `uniform` declaration
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    /// Variable name
    pub name: String,
    /// Declared type
    pub ty: GlslType,
    /// Explicit `layout(location = N)` if present
    pub location: Option<u32>,
    /// 1-based source line of the declaration
    pub line: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Qualifier {
    In,
    Out,
    Uniform,
}

/// A validated shader stage, ready to execute
///
/// Produced by [`compile`]; running it cannot fail, every construct that
/// passed validation has defined execution.
#[derive(Debug, Clone)]
pub struct ShaderModule {
    /// Stage this module was compiled for
    pub stage: ShaderStage,
    /// Declared version (e.g. 330)
    pub version: u32,
    /// `in` declarations, in source order
    pub inputs: Vec<Declaration>,
    /// `out` declarations, in source order
    pub outputs: Vec<Declaration>,
    /// `uniform` declarations, in source order
    pub uniforms: Vec<Declaration>,
    assignments: Vec<Assignment>,
}

impl ShaderModule {
    /// Look up a uniform declaration by name
    pub fn uniform(&self, name: &str) -> Option<&Declaration> {
        self.uniforms.iter().find(|decl| decl.name == name)
    }

    /// Run the stage
    ///
    /// `inputs` supplies the stage's `in` variables by name (attributes for
    /// the vertex stage, interpolated varyings for the fragment stage);
    /// `uniforms` supplies uniform values, defaulting to zero when absent.
    /// Returns the assigned targets by name: the declared `out`s, plus
    /// `gl_Position` for the vertex stage.
    pub fn run(
        &self,
        inputs: &FxHashMap<String, Value>,
        uniforms: &FxHashMap<String, Value>,
    ) -> FxHashMap<String, Value> {
        let mut written = FxHashMap::default();
        for assignment in &self.assignments {
            let value = self.eval(&assignment.value, inputs, uniforms);
            written.insert(assignment.target.clone(), value);
        }
        written
    }

    fn eval(
        &self,
        expr: &Expr,
        inputs: &FxHashMap<String, Value>,
        uniforms: &FxHashMap<String, Value>,
    ) -> Value {
        match expr {
            Expr::Literal(x) => Value::Float(*x),
            Expr::Ident(name) => {
                if let Some(value) = inputs.get(name) {
                    *value
                } else if let Some(value) = uniforms.get(name) {
                    *value
                } else if let Some(decl) = self.uniform(name) {
                    // Unset uniforms read as zero
                    Value::zero(decl.ty)
                } else {
                    // Unreachable for validated modules; inputs are always
                    // provided by the caller
                    Value::Float(0.0)
                }
            }
            Expr::Swizzle { base, components } => {
                let parts = self.eval(base, inputs, uniforms).to_array();
                let picked: Vec<f32> = components.iter().map(|&i| parts[i]).collect();
                Value::from_components(&picked)
            }
            Expr::Constructor { ty, args } => {
                let mut parts = Vec::with_capacity(4);
                for arg in args {
                    let value = self.eval(arg, inputs, uniforms);
                    parts.extend_from_slice(&value.to_array()[..value.ty().components()]);
                }
                // Single-scalar constructors splat
                if parts.len() == 1 && ty.components() > 1 {
                    let x = parts[0];
                    parts.resize(ty.components(), x);
                }
                Value::from_components(&parts[..ty.components()])
            }
            Expr::Negate(inner) => {
                let value = self.eval(inner, inputs, uniforms);
                let parts = value.to_array();
                let negated: Vec<f32> = parts[..value.ty().components()]
                    .iter()
                    .map(|x| -x)
                    .collect();
                Value::from_components(&negated)
            }
        }
    }
}

// ============================================================================
// AST
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
enum Expr {
    Literal(f32),
    Ident(String),
    Swizzle { base: Box<Expr>, components: Vec<usize> },
    Constructor { ty: GlslType, args: Vec<Expr> },
    Negate(Box<Expr>),
}

#[derive(Debug, Clone, PartialEq)]
struct Assignment {
    target: String,
    value: Expr,
    line: u32,
}

// ============================================================================
// Tokenizer
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Ident(String),
    Number(f32),
    Symbol(char),
}

#[derive(Debug, Clone, PartialEq)]
struct Tok {
    token: Token,
    line: u32,
}

/// Replace comments with spaces, preserving newlines so line numbers
/// survive for diagnostics
fn strip_comments(stage: ShaderStage, source: &str) -> Result<String> {
    let mut out = String::with_capacity(source.len());
    let mut chars = source.chars().peekable();
    let mut line = 1u32;

    while let Some(c) = chars.next() {
        match c {
            '\n' => {
                line += 1;
                out.push('\n');
            }
            '/' if chars.peek() == Some(&'/') => {
                // Line comment runs to end of line
                for c in chars.by_ref() {
                    if c == '\n' {
                        line += 1;
                        out.push('\n');
                        break;
                    }
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let start_line = line;
                let mut closed = false;
                while let Some(c) = chars.next() {
                    match c {
                        '\n' => {
                            line += 1;
                            out.push('\n');
                        }
                        '*' if chars.peek() == Some(&'/') => {
                            chars.next();
                            out.push(' ');
                            closed = true;
                            break;
                        }
                        _ => {}
                    }
                }
                if !closed {
                    return Err(compile_error(stage, start_line, "unterminated block comment"));
                }
            }
            _ => out.push(c),
        }
    }
    Ok(out)
}

/// Split off and check the `#version` directive, returning the version and
/// the remaining source (with the directive line blanked)
fn take_version_directive(stage: ShaderStage, source: &str) -> Result<(u32, String)> {
    // The directive must be the first significant content
    let mut line = 1u32;
    let mut rest = source;
    loop {
        let trimmed = rest.trim_start_matches([' ', '\t', '\r']);
        if let Some(after) = trimmed.strip_prefix('\n') {
            line += 1;
            rest = after;
            continue;
        }
        rest = trimmed;
        break;
    }

    if !rest.starts_with('#') {
        return Err(compile_error(stage, line, "expected '#version' directive"));
    }

    let (directive, tail) = match rest.find('\n') {
        Some(end) => (&rest[..end], &rest[end..]),
        None => (rest, ""),
    };

    let mut words = directive[1..].split_whitespace();
    if words.next() != Some("version") {
        return Err(compile_error(stage, line, "expected '#version' directive"));
    }
    let number = words
        .next()
        .and_then(|w| w.parse::<u32>().ok())
        .ok_or_else(|| compile_error(stage, line, "malformed '#version' directive"))?;
    if !KNOWN_VERSIONS.contains(&number) {
        return Err(compile_error(
            stage,
            line,
            format!("unsupported GLSL version '{}'", number),
        ));
    }
    match words.next() {
        None | Some("core") | Some("es") => {}
        Some(profile) => {
            return Err(compile_error(
                stage,
                line,
                format!("unsupported profile '{}'", profile),
            ));
        }
    }
    if words.next().is_some() {
        return Err(compile_error(stage, line, "malformed '#version' directive"));
    }

    // Blank the directive but keep the line structure intact
    let mut remaining = String::with_capacity(source.len());
    for _ in 1..line {
        remaining.push('\n');
    }
    remaining.push_str(&" ".repeat(directive.len()));
    remaining.push_str(tail);
    Ok((number, remaining))
}

fn tokenize(stage: ShaderStage, source: &str) -> Result<Vec<Tok>> {
    let mut tokens = Vec::new();
    let mut chars = source.char_indices().peekable();
    let mut line = 1u32;

    while let Some((start, c)) = chars.next() {
        match c {
            '\n' => line += 1,
            c if c.is_whitespace() => {}
            c if c.is_ascii_alphabetic() || c == '_' => {
                let mut end = start + c.len_utf8();
                while let Some(&(i, c)) = chars.peek() {
                    if c.is_ascii_alphanumeric() || c == '_' {
                        chars.next();
                        end = i + c.len_utf8();
                    } else {
                        break;
                    }
                }
                tokens.push(Tok {
                    token: Token::Ident(source[start..end].to_string()),
                    line,
                });
            }
            c if c.is_ascii_digit() || c == '.' => {
                // A lone '.' is the swizzle operator, not a number
                if c == '.' && !chars.peek().is_some_and(|&(_, c)| c.is_ascii_digit()) {
                    tokens.push(Tok { token: Token::Symbol('.'), line });
                    continue;
                }
                let mut end = start + c.len_utf8();
                let mut seen_dot = c == '.';
                while let Some(&(i, c)) = chars.peek() {
                    if c.is_ascii_digit() || (c == '.' && !seen_dot) {
                        seen_dot |= c == '.';
                        chars.next();
                        end = i + c.len_utf8();
                    } else {
                        break;
                    }
                }
                let text = &source[start..end];
                let number = text.parse::<f32>().map_err(|_| {
                    compile_error(stage, line, format!("malformed number '{}'", text))
                })?;
                tokens.push(Tok { token: Token::Number(number), line });
            }
            '(' | ')' | '{' | '}' | ',' | ';' | '=' | '.' | '-' => {
                tokens.push(Tok { token: Token::Symbol(c), line });
            }
            '#' => {
                return Err(compile_error(
                    stage,
                    line,
                    "preprocessor directives other than '#version' are not supported",
                ));
            }
            c => {
                return Err(compile_error(stage, line, format!("unexpected character '{}'", c)));
            }
        }
    }
    Ok(tokens)
}

// ============================================================================
// Parser
// ============================================================================

struct Parser {
    stage: ShaderStage,
    tokens: Vec<Tok>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Tok> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Tok> {
        let tok = self.tokens.get(self.pos).cloned();
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn line(&self) -> u32 {
        self.tokens
            .get(self.pos.min(self.tokens.len().saturating_sub(1)))
            .map(|t| t.line)
            .unwrap_or(1)
    }

    fn error(&self, message: impl AsRef<str>) -> Error {
        compile_error(self.stage, self.line(), message)
    }

    fn expect_symbol(&mut self, symbol: char) -> Result<()> {
        match self.next() {
            Some(Tok { token: Token::Symbol(c), .. }) if c == symbol => Ok(()),
            _ => {
                self.pos = self.pos.saturating_sub(1);
                Err(self.error(format!("expected '{}'", symbol)))
            }
        }
    }

    fn expect_ident(&mut self) -> Result<(String, u32)> {
        match self.next() {
            Some(Tok { token: Token::Ident(name), line }) => Ok((name, line)),
            _ => {
                self.pos = self.pos.saturating_sub(1);
                Err(self.error("expected identifier"))
            }
        }
    }

    fn eat_symbol(&mut self, symbol: char) -> bool {
        if matches!(self.peek(), Some(Tok { token: Token::Symbol(c), .. }) if *c == symbol) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn eat_keyword(&mut self, word: &str) -> bool {
        if matches!(self.peek(), Some(Tok { token: Token::Ident(name), .. }) if name == word) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Parse the whole module after the version directive
    fn parse_module(&mut self) -> Result<(Vec<(Qualifier, Declaration)>, Vec<Assignment>)> {
        let mut declarations = Vec::new();
        let mut body: Option<Vec<Assignment>> = None;

        while self.peek().is_some() {
            if self.eat_keyword("void") {
                let (name, _) = self.expect_ident()?;
                if name != "main" {
                    return Err(self.error(format!("expected 'main', found '{}'", name)));
                }
                if body.is_some() {
                    return Err(self.error("'main' is already defined"));
                }
                self.expect_symbol('(')?;
                self.expect_symbol(')')?;
                self.expect_symbol('{')?;
                body = Some(self.parse_body()?);
            } else {
                declarations.push(self.parse_declaration()?);
            }
        }

        let body = body.ok_or_else(|| {
            compile_error(self.stage, 1, "missing 'void main()' definition")
        })?;
        Ok((declarations, body))
    }

    /// `[layout(location = N)] in|out|uniform type name;`
    fn parse_declaration(&mut self) -> Result<(Qualifier, Declaration)> {
        let mut location = None;
        if self.eat_keyword("layout") {
            self.expect_symbol('(')?;
            let (word, _) = self.expect_ident()?;
            if word != "location" {
                return Err(self.error(format!("unsupported layout qualifier '{}'", word)));
            }
            self.expect_symbol('=')?;
            let value = match self.next() {
                Some(Tok { token: Token::Number(n), .. }) if n >= 0.0 && n.fract() == 0.0 => {
                    n as u32
                }
                _ => {
                    self.pos = self.pos.saturating_sub(1);
                    return Err(self.error("expected location index"));
                }
            };
            self.expect_symbol(')')?;
            location = Some(value);
        }

        let (qualifier_word, line) = self.expect_ident()?;
        let qualifier = match qualifier_word.as_str() {
            "in" => Qualifier::In,
            "out" => Qualifier::Out,
            "uniform" => Qualifier::Uniform,
            other => {
                return Err(compile_error(
                    self.stage,
                    line,
                    format!("expected 'in', 'out' or 'uniform', found '{}'", other),
                ));
            }
        };

        let (type_word, _) = self.expect_ident()?;
        let ty = GlslType::parse(&type_word).ok_or_else(|| {
            self.error(format!("unknown type '{}'", type_word))
        })?;
        let (name, _) = self.expect_ident()?;
        self.expect_symbol(';')?;

        Ok((qualifier, Declaration { name, ty, location, line }))
    }

    /// Statements until the closing brace of `main`
    fn parse_body(&mut self) -> Result<Vec<Assignment>> {
        let mut statements = Vec::new();
        loop {
            if self.eat_symbol('}') {
                return Ok(statements);
            }
            if self.peek().is_none() {
                return Err(self.error("unexpected end of shader inside 'main'"));
            }
            let (target, line) = self.expect_ident()?;
            self.expect_symbol('=')?;
            let value = self.parse_expr()?;
            self.expect_symbol(';')?;
            statements.push(Assignment { target, value, line });
        }
    }

    fn parse_expr(&mut self) -> Result<Expr> {
        if self.eat_symbol('-') {
            let inner = self.parse_expr()?;
            return Ok(Expr::Negate(Box::new(inner)));
        }
        self.parse_postfix()
    }

    fn parse_postfix(&mut self) -> Result<Expr> {
        let mut expr = self.parse_primary()?;
        while self.eat_symbol('.') {
            let (word, line) = self.expect_ident()?;
            let components = parse_swizzle(&word).ok_or_else(|| {
                compile_error(self.stage, line, format!("invalid swizzle '.{}'", word))
            })?;
            expr = Expr::Swizzle { base: Box::new(expr), components };
        }
        Ok(expr)
    }

    fn parse_primary(&mut self) -> Result<Expr> {
        if self.eat_symbol('(') {
            let inner = self.parse_expr()?;
            self.expect_symbol(')')?;
            return Ok(inner);
        }
        match self.next() {
            Some(Tok { token: Token::Number(n), .. }) => Ok(Expr::Literal(n)),
            Some(Tok { token: Token::Ident(name), line }) => {
                if let Some(ty) = GlslType::parse(&name) {
                    self.expect_symbol('(')?;
                    let mut args = Vec::new();
                    loop {
                        args.push(self.parse_expr()?);
                        if self.eat_symbol(',') {
                            continue;
                        }
                        self.expect_symbol(')')?;
                        break;
                    }
                    Ok(Expr::Constructor { ty, args })
                } else if name == "main" || name == "void" {
                    Err(compile_error(
                        self.stage,
                        line,
                        format!("unexpected '{}' in expression", name),
                    ))
                } else {
                    Ok(Expr::Ident(name))
                }
            }
            _ => {
                self.pos = self.pos.saturating_sub(1);
                Err(self.error("expected expression"))
            }
        }
    }
}

/// Map a swizzle word to component indices; None if any letter is not xyzw
/// or the swizzle is longer than 4
fn parse_swizzle(word: &str) -> Option<Vec<usize>> {
    if word.is_empty() || word.len() > 4 {
        return None;
    }
    word.chars()
        .map(|c| match c {
            'x' => Some(0),
            'y' => Some(1),
            'z' => Some(2),
            'w' => Some(3),
            _ => None,
        })
        .collect()
}

// ============================================================================
// Validation
// ============================================================================

struct Validator<'a> {
    stage: ShaderStage,
    inputs: &'a [Declaration],
    outputs: &'a [Declaration],
    uniforms: &'a [Declaration],
}

impl Validator<'_> {
    fn lookup(&self, name: &str) -> Option<(Qualifier, &Declaration)> {
        if let Some(decl) = self.inputs.iter().find(|d| d.name == name) {
            return Some((Qualifier::In, decl));
        }
        if let Some(decl) = self.outputs.iter().find(|d| d.name == name) {
            return Some((Qualifier::Out, decl));
        }
        if let Some(decl) = self.uniforms.iter().find(|d| d.name == name) {
            return Some((Qualifier::Uniform, decl));
        }
        None
    }

    fn check_assignment(&self, assignment: &Assignment) -> Result<()> {
        let target_ty = self.target_type(assignment)?;
        let value_ty = self.check_expr(&assignment.value, assignment.line)?;
        if value_ty != target_ty {
            return Err(compile_error(
                self.stage,
                assignment.line,
                format!(
                    "cannot assign '{}' to '{}' ('{}')",
                    value_ty.name(),
                    assignment.target,
                    target_ty.name()
                ),
            ));
        }
        Ok(())
    }

    fn target_type(&self, assignment: &Assignment) -> Result<GlslType> {
        if assignment.target == "gl_Position" {
            if self.stage != ShaderStage::Vertex {
                return Err(compile_error(
                    self.stage,
                    assignment.line,
                    "'gl_Position' is only writable in the vertex stage",
                ));
            }
            return Ok(GlslType::Vec4);
        }
        match self.lookup(&assignment.target) {
            Some((Qualifier::Out, decl)) => Ok(decl.ty),
            Some((Qualifier::In, _)) | Some((Qualifier::Uniform, _)) => Err(compile_error(
                self.stage,
                assignment.line,
                format!("cannot assign to read-only variable '{}'", assignment.target),
            )),
            None => Err(compile_error(
                self.stage,
                assignment.line,
                format!("undeclared identifier '{}'", assignment.target),
            )),
        }
    }

    fn check_expr(&self, expr: &Expr, line: u32) -> Result<GlslType> {
        match expr {
            Expr::Literal(_) => Ok(GlslType::Float),
            Expr::Ident(name) => match self.lookup(name) {
                Some((Qualifier::In, decl)) | Some((Qualifier::Uniform, decl)) => Ok(decl.ty),
                Some((Qualifier::Out, _)) => Err(compile_error(
                    self.stage,
                    line,
                    format!("cannot read output variable '{}'", name),
                )),
                None => Err(compile_error(
                    self.stage,
                    line,
                    format!("undeclared identifier '{}'", name),
                )),
            },
            Expr::Swizzle { base, components } => {
                let base_ty = self.check_expr(base, line)?;
                let available = base_ty.components();
                for &index in components {
                    if index >= available {
                        return Err(compile_error(
                            self.stage,
                            line,
                            format!(
                                "swizzle component '{}' out of range for '{}'",
                                ['x', 'y', 'z', 'w'][index],
                                base_ty.name()
                            ),
                        ));
                    }
                }
                Ok(GlslType::from_components(components.len()))
            }
            Expr::Constructor { ty, args } => {
                let mut total = 0;
                for arg in args {
                    total += self.check_expr(arg, line)?.components();
                }
                // One scalar splats to any width
                let splat = total == 1 && args.len() == 1;
                if total != ty.components() && !splat {
                    return Err(compile_error(
                        self.stage,
                        line,
                        format!(
                            "'{}' constructor expects {} components, got {}",
                            ty.name(),
                            ty.components(),
                            total
                        ),
                    ));
                }
                Ok(*ty)
            }
            Expr::Negate(inner) => self.check_expr(inner, line),
        }
    }
}

// ============================================================================
// Compilation entry point
// ============================================================================

/// Compile one stage of GLSL source into a validated [`ShaderModule`]
///
/// # Errors
///
/// Returns `CompileError` with a `0:<line>:` prefixed message for any
/// construct outside the accepted subset.
pub fn compile(stage: ShaderStage, source: &str) -> Result<ShaderModule> {
    let stripped = strip_comments(stage, source)?;
    let (version, rest) = take_version_directive(stage, &stripped)?;
    let tokens = tokenize(stage, &rest)?;

    let mut parser = Parser { stage, tokens, pos: 0 };
    let (declarations, assignments) = parser.parse_module()?;

    let mut inputs = Vec::new();
    let mut outputs = Vec::new();
    let mut uniforms = Vec::new();
    for (qualifier, decl) in declarations {
        if decl.name == "gl_Position" {
            return Err(compile_error(
                stage,
                decl.line,
                "'gl_Position' is built in and cannot be declared",
            ));
        }
        let exists = inputs
            .iter()
            .chain(outputs.iter())
            .chain(uniforms.iter())
            .any(|d: &Declaration| d.name == decl.name);
        if exists {
            return Err(compile_error(
                stage,
                decl.line,
                format!("duplicate declaration of '{}'", decl.name),
            ));
        }
        match qualifier {
            Qualifier::In => inputs.push(decl),
            Qualifier::Out => outputs.push(decl),
            Qualifier::Uniform => uniforms.push(decl),
        }
    }

    let validator = Validator { stage, inputs: &inputs, outputs: &outputs, uniforms: &uniforms };
    for assignment in &assignments {
        validator.check_assignment(assignment)?;
    }

    // Stage-specific contract: the vertex stage must produce a position,
    // the fragment stage exactly one vec4 color output that it writes
    match stage {
        ShaderStage::Vertex => {
            if !assignments.iter().any(|a| a.target == "gl_Position") {
                return Err(compile_error(stage, 1, "vertex stage never assigns 'gl_Position'"));
            }
        }
        ShaderStage::Fragment => {
            if outputs.len() != 1 {
                return Err(compile_error(
                    stage,
                    1,
                    format!(
                        "fragment stage must declare exactly one output, found {}",
                        outputs.len()
                    ),
                ));
            }
            let color = &outputs[0];
            if color.ty != GlslType::Vec4 {
                return Err(compile_error(
                    stage,
                    color.line,
                    format!("fragment output '{}' must be 'vec4'", color.name),
                ));
            }
            if !assignments.iter().any(|a| a.target == color.name) {
                return Err(compile_error(
                    stage,
                    1,
                    format!("fragment stage never assigns its output '{}'", color.name),
                ));
            }
        }
    }

    Ok(ShaderModule { stage, version, inputs, outputs, uniforms, assignments })
}

#[cfg(test)]
#[path = "glsl_tests.rs"]
mod tests;
