//! Tolerant parsing of the semi-structured venue attributes payload.
//!
//! Data sources ship attributes either as a Python-style dict literal
//! (`{'RestaurantsPriceRange2': '2', 'GoodForMeal': "{'dinner': True}"}`) or
//! as a JSON object. Both are read into a `serde_json` map; anything else is
//! reported as [`Attributes::Unknown`]. Parsing never fails past this module.

use serde_json::{Map, Number, Value};
use thiserror::Error;

const PRICE_RANGE_KEY: &str = "RestaurantsPriceRange2";
const GOOD_FOR_MEAL_KEY: &str = "GoodForMeal";

/// Same nesting limit as `serde_json`
const MAX_NESTING: usize = 128;

/// Outcome of parsing an attributes payload
#[derive(Debug, Clone, PartialEq)]
pub enum Attributes {
    Parsed(ParsedAttributes),
    Unknown,
}

impl Attributes {
    pub fn price_level(&self) -> Option<u8> {
        match self {
            Attributes::Parsed(parsed) => parsed.price_level,
            Attributes::Unknown => None,
        }
    }

    pub fn meal_suitability(&self) -> MealSuitability {
        match self {
            Attributes::Parsed(parsed) => parsed.good_for_meal,
            Attributes::Unknown => MealSuitability::default(),
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Attributes::Unknown)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParsedAttributes {
    pub price_level: Option<u8>,
    pub good_for_meal: MealSuitability,
}

/// Meal-suitability flags from the `GoodForMeal` attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MealSuitability {
    pub breakfast: bool,
    pub brunch: bool,
    pub lunch: bool,
    pub dinner: bool,
    pub latenight: bool,
    pub dessert: bool,
}

impl MealSuitability {
    /// Names of the flags that are set, in a fixed order
    pub fn flags(&self) -> Vec<&'static str> {
        [
            ("breakfast", self.breakfast),
            ("brunch", self.brunch),
            ("lunch", self.lunch),
            ("dinner", self.dinner),
            ("latenight", self.latenight),
            ("dessert", self.dessert),
        ]
        .into_iter()
        .filter_map(|(name, set)| set.then_some(name))
        .collect()
    }
}

/// Parse an attributes payload. Dict-literal syntax is tried first, then JSON.
pub fn parse_attributes(raw: Option<&str>) -> Attributes {
    let Some(map) = raw.and_then(parse_object) else {
        return Attributes::Unknown;
    };

    Attributes::Parsed(ParsedAttributes {
        price_level: map.get(PRICE_RANGE_KEY).and_then(price_level_from_value),
        good_for_meal: map
            .get(GOOD_FOR_MEAL_KEY)
            .map(meal_suitability_from_value)
            .unwrap_or_default(),
    })
}

fn parse_object(raw: &str) -> Option<Map<String, Value>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(Value::Object(map)) = parse_literal(trimmed) {
        return Some(map);
    }
    match serde_json::from_str::<Value>(trimmed) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

/// Price level as an integer; `"2"`, `2`, `"2.0"` and `2.0` all give `Some(2)`.
fn price_level_from_value(value: &Value) -> Option<u8> {
    let level = match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>().ok().or_else(|| {
                s.parse::<f64>()
                    .ok()
                    .filter(|f| f.is_finite())
                    .map(|f| f.trunc() as i64)
            })
        }
        Value::Bool(b) => Some(i64::from(*b)),
        _ => None,
    }?;
    u8::try_from(level).ok()
}

fn meal_suitability_from_value(value: &Value) -> MealSuitability {
    let nested;
    let map = match value {
        Value::Object(map) => map,
        Value::String(s) => match parse_object(s) {
            Some(map) => {
                nested = map;
                &nested
            }
            None => return MealSuitability::default(),
        },
        _ => return MealSuitability::default(),
    };

    let flag = |key: &str| match map.get(key) {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => s.trim().eq_ignore_ascii_case("true"),
        _ => false,
    };

    MealSuitability {
        breakfast: flag("breakfast"),
        brunch: flag("brunch"),
        lunch: flag("lunch"),
        dinner: flag("dinner"),
        latenight: flag("latenight"),
        dessert: flag("dessert"),
    }
}

#[derive(Debug, Error, PartialEq)]
#[error("invalid literal at byte {position}: {reason}")]
pub struct LiteralError {
    pub position: usize,
    pub reason: &'static str,
}

/// Parse a Python literal (dicts, lists, tuples, strings, numbers,
/// `True`/`False`/`None`) into a JSON value.
pub fn parse_literal(input: &str) -> Result<Value, LiteralError> {
    let mut parser = LiteralParser {
        src: input,
        pos: 0,
        depth: 0,
    };
    let value = parser.value()?;
    parser.skip_whitespace();
    if parser.pos != input.len() {
        return Err(parser.error("trailing characters"));
    }
    Ok(value)
}

struct LiteralParser<'a> {
    src: &'a str,
    pos: usize,
    depth: usize,
}

impl<'a> LiteralParser<'a> {
    fn error(&self, reason: &'static str) -> LiteralError {
        LiteralError {
            position: self.pos,
            reason,
        }
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.bump();
        }
    }

    fn expect(&mut self, expected: char) -> Result<(), LiteralError> {
        self.skip_whitespace();
        match self.bump() {
            Some(c) if c == expected => Ok(()),
            _ => Err(self.error("unexpected character")),
        }
    }

    fn value(&mut self) -> Result<Value, LiteralError> {
        self.skip_whitespace();
        match self.peek() {
            Some('{') => self.nested(|p| p.dict()),
            Some('[') => self.nested(|p| p.sequence('[', ']')),
            Some('(') => self.nested(|p| p.sequence('(', ')')),
            Some('\'') | Some('"') => self.string(false).map(Value::String),
            Some(c) if c.is_ascii_digit() || matches!(c, '-' | '+' | '.') => self.number(),
            Some(c) if c.is_alphabetic() || c == '_' => self.word(),
            Some(_) => Err(self.error("unexpected character")),
            None => Err(self.error("unexpected end of input")),
        }
    }

    fn nested<F>(&mut self, parse: F) -> Result<Value, LiteralError>
    where
        F: FnOnce(&mut Self) -> Result<Value, LiteralError>,
    {
        if self.depth >= MAX_NESTING {
            return Err(self.error("nesting too deep"));
        }
        self.depth += 1;
        let value = parse(self);
        self.depth -= 1;
        value
    }

    fn dict(&mut self) -> Result<Value, LiteralError> {
        self.expect('{')?;
        let mut map = Map::new();
        loop {
            self.skip_whitespace();
            if self.peek() == Some('}') {
                self.bump();
                return Ok(Value::Object(map));
            }
            let key = match self.value()? {
                Value::String(s) => s,
                Value::Number(n) => n.to_string(),
                Value::Bool(true) => "True".to_string(),
                Value::Bool(false) => "False".to_string(),
                Value::Null => "None".to_string(),
                _ => return Err(self.error("unhashable dict key")),
            };
            self.expect(':')?;
            let value = self.value()?;
            map.insert(key, value);

            self.skip_whitespace();
            match self.bump() {
                Some(',') => continue,
                Some('}') => return Ok(Value::Object(map)),
                _ => return Err(self.error("expected ',' or '}'")),
            }
        }
    }

    fn sequence(&mut self, open: char, close: char) -> Result<Value, LiteralError> {
        self.expect(open)?;
        let mut items = Vec::new();
        loop {
            self.skip_whitespace();
            if self.peek() == Some(close) {
                self.bump();
                return Ok(Value::Array(items));
            }
            items.push(self.value()?);
            self.skip_whitespace();
            match self.bump() {
                Some(',') => continue,
                Some(c) if c == close => return Ok(Value::Array(items)),
                _ => return Err(self.error("expected separator")),
            }
        }
    }

    fn string(&mut self, raw: bool) -> Result<String, LiteralError> {
        let quote = match self.bump() {
            Some(q @ ('\'' | '"')) => q,
            _ => return Err(self.error("expected quote")),
        };
        let mut out = String::new();
        loop {
            match self.bump() {
                None => return Err(self.error("unterminated string")),
                Some(c) if c == quote => return Ok(out),
                Some('\\') if raw => {
                    out.push('\\');
                    if let Some(next) = self.bump() {
                        out.push(next);
                    }
                }
                Some('\\') => match self.bump() {
                    Some('n') => out.push('\n'),
                    Some('t') => out.push('\t'),
                    Some('r') => out.push('\r'),
                    Some('0') => out.push('\0'),
                    Some(c @ ('\\' | '\'' | '"')) => out.push(c),
                    Some(c) => {
                        out.push('\\');
                        out.push(c);
                    }
                    None => return Err(self.error("unterminated string")),
                },
                Some(c) => out.push(c),
            }
        }
    }

    fn number(&mut self) -> Result<Value, LiteralError> {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_digit() || matches!(c, '-' | '+' | '.' | 'e' | 'E' | '_'))
        {
            self.bump();
        }
        let text: String = self.src[start..self.pos].chars().filter(|c| *c != '_').collect();

        if let Ok(i) = text.parse::<i64>() {
            return Ok(Value::Number(i.into()));
        }
        text.parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .ok_or_else(|| self.error("invalid number"))
    }

    fn word(&mut self) -> Result<Value, LiteralError> {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_alphanumeric() || c == '_') {
            self.bump();
        }
        let word = &self.src[start..self.pos];

        // String prefixes: u'..', b'..', r'..'
        if matches!(self.peek(), Some('\'' | '"')) {
            return match word.to_ascii_lowercase().as_str() {
                "u" | "b" => self.string(false).map(Value::String),
                "r" | "ur" | "br" | "rb" => self.string(true).map(Value::String),
                _ => Err(self.error("unknown string prefix")),
            };
        }

        match word {
            "True" => Ok(Value::Bool(true)),
            "False" => Ok(Value::Bool(false)),
            "None" => Ok(Value::Null),
            _ => Err(self.error("unknown identifier")),
        }
    }
}
