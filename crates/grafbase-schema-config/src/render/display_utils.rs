use std::{
    borrow::Cow,
    fmt::{self, Display, Write},
};

/// Indentation of a directive inside an `extend schema` block.
pub(crate) const DIRECTIVE_INDENT: &str = "  ";
/// Indentation of the arguments of a block directive.
pub(crate) const ARGUMENT_INDENT: &str = "    ";
/// Indentation of the items of a list argument of a block directive.
pub(crate) const ITEM_INDENT: &str = "      ";
/// Indentation of fields in type bodies.
pub(crate) const FIELD_INDENT: &str = "  ";

pub(crate) fn write_quoted(sdl: &mut impl Write, s: &str) -> fmt::Result {
    sdl.write_char('"')?;
    for c in s.chars() {
        match c {
            '\r' => sdl.write_str("\\r"),
            '\n' => sdl.write_str("\\n"),
            '\t' => sdl.write_str("\\t"),
            '\\' => sdl.write_str("\\\\"),
            '"' => sdl.write_str("\\\""),
            c if c.is_control() => write!(sdl, "\\u{:04x}", c as u32),
            c => sdl.write_char(c),
        }?
    }
    sdl.write_char('"')
}

/// A GraphQL input value as written in directive arguments.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum SdlValue<'a> {
    String(Cow<'a, str>),
    Int(i64),
    Float(f64),
    Boolean(bool),
    /// Written bare, without quotes.
    Enum(Cow<'a, str>),
    List(Vec<SdlValue<'a>>),
    Object(Vec<(&'a str, SdlValue<'a>)>),
}

impl<'a> SdlValue<'a> {
    pub(crate) fn enum_value(value: impl Into<Cow<'a, str>>) -> Self {
        SdlValue::Enum(value.into())
    }

    pub(crate) fn strings<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Cow<'a, str>>,
    {
        SdlValue::List(values.into_iter().map(|value| SdlValue::String(value.into())).collect())
    }
}

impl Display for SdlValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SdlValue::String(s) => write_quoted(f, s),
            SdlValue::Int(i) => Display::fmt(i, f),
            SdlValue::Float(val) => Display::fmt(val, f),
            SdlValue::Boolean(true) => f.write_str("true"),
            SdlValue::Boolean(false) => f.write_str("false"),
            SdlValue::Enum(val) => f.write_str(val),
            SdlValue::List(values) => {
                let mut values = values.iter().peekable();

                f.write_char('[')?;
                while let Some(value) = values.next() {
                    value.fmt(f)?;
                    if values.peek().is_some() {
                        f.write_str(", ")?;
                    }
                }
                f.write_char(']')
            }
            SdlValue::Object(key_values) if key_values.is_empty() => f.write_str("{}"),
            SdlValue::Object(key_values) => {
                let mut key_values = key_values.iter().peekable();

                f.write_str("{ ")?;
                while let Some((key, value)) = key_values.next() {
                    f.write_str(key)?;
                    f.write_str(": ")?;
                    value.fmt(f)?;
                    if key_values.peek().is_some() {
                        f.write_str(", ")?;
                    }
                }
                f.write_str(" }")
            }
        }
    }
}

impl<'a> From<&'a str> for SdlValue<'a> {
    fn from(value: &'a str) -> Self {
        SdlValue::String(Cow::Borrowed(value))
    }
}

impl From<String> for SdlValue<'_> {
    fn from(value: String) -> Self {
        SdlValue::String(Cow::Owned(value))
    }
}

impl From<bool> for SdlValue<'_> {
    fn from(value: bool) -> Self {
        SdlValue::Boolean(value)
    }
}

impl From<i64> for SdlValue<'_> {
    fn from(value: i64) -> Self {
        SdlValue::Int(value)
    }
}

impl From<u32> for SdlValue<'_> {
    fn from(value: u32) -> Self {
        SdlValue::Int(i64::from(value))
    }
}

impl From<u64> for SdlValue<'_> {
    fn from(value: u64) -> Self {
        SdlValue::Int(i64::try_from(value).unwrap_or(i64::MAX))
    }
}

impl From<f64> for SdlValue<'_> {
    fn from(value: f64) -> Self {
        SdlValue::Float(value)
    }
}

/// Writes an inline directive: `@name(arg: value, other: value)`. The parenthesis is only opened
/// when the first argument is written, and closed on drop.
pub(crate) struct DirectiveWriter<'a, 'b> {
    f: &'a mut fmt::Formatter<'b>,
    paren_open: bool,
}

impl<'a, 'b> DirectiveWriter<'a, 'b> {
    pub(crate) fn new(directive_name: &str, f: &'a mut fmt::Formatter<'b>) -> Result<Self, fmt::Error> {
        f.write_str("@")?;
        f.write_str(directive_name)?;

        Ok(DirectiveWriter { f, paren_open: false })
    }

    pub(crate) fn arg<'c>(mut self, name: &str, value: impl Into<SdlValue<'c>>) -> Result<Self, fmt::Error> {
        if !self.paren_open {
            self.f.write_str("(")?;
            self.paren_open = true;
        } else {
            self.f.write_str(", ")?;
        }

        let value: SdlValue<'c> = value.into();

        self.f.write_str(name)?;
        self.f.write_str(": ")?;
        value.fmt(self.f)?;

        Ok(self)
    }

    pub(crate) fn opt_arg<'c, T>(self, name: &str, value: Option<T>) -> Result<Self, fmt::Error>
    where
        T: Into<SdlValue<'c>>,
    {
        match value {
            Some(value) => self.arg(name, value),
            None => Ok(self),
        }
    }
}

impl Drop for DirectiveWriter<'_, '_> {
    fn drop(&mut self) {
        if self.paren_open {
            self.f.write_str(")").ok();
        }
    }
}

/// Writes a directive spread over multiple lines, one argument per line:
///
/// ```text
///   @name(
///     arg: value
///     list: [
///       item
///     ]
///   )
/// ```
///
/// A directive with no arguments is written bare. The closing parenthesis is written by
/// [`DirectiveBlock::finish`].
pub(crate) struct DirectiveBlock<'a, 'b> {
    f: &'a mut fmt::Formatter<'b>,
    paren_open: bool,
}

impl<'a, 'b> DirectiveBlock<'a, 'b> {
    pub(crate) fn new(directive_name: &str, f: &'a mut fmt::Formatter<'b>) -> Result<Self, fmt::Error> {
        f.write_str(DIRECTIVE_INDENT)?;
        f.write_str("@")?;
        f.write_str(directive_name)?;

        Ok(DirectiveBlock { f, paren_open: false })
    }

    fn open(&mut self) -> fmt::Result {
        if !self.paren_open {
            self.f.write_str("(\n")?;
            self.paren_open = true;
        }

        Ok(())
    }

    pub(crate) fn arg<'c>(mut self, name: &str, value: impl Into<SdlValue<'c>>) -> Result<Self, fmt::Error> {
        let value: SdlValue<'c> = value.into();

        self.open()?;
        writeln!(self.f, "{ARGUMENT_INDENT}{name}: {value}")?;

        Ok(self)
    }

    pub(crate) fn opt_arg<'c, T>(self, name: &str, value: Option<T>) -> Result<Self, fmt::Error>
    where
        T: Into<SdlValue<'c>>,
    {
        match value {
            Some(value) => self.arg(name, value),
            None => Ok(self),
        }
    }

    /// Writes a list argument with one item per line. Empty lists are skipped.
    pub(crate) fn list<I>(mut self, name: &str, items: I) -> Result<Self, fmt::Error>
    where
        I: IntoIterator,
        I::Item: Display,
    {
        let mut items = items.into_iter().peekable();

        if items.peek().is_none() {
            return Ok(self);
        }

        self.open()?;
        writeln!(self.f, "{ARGUMENT_INDENT}{name}: [")?;

        for item in items {
            writeln!(self.f, "{ITEM_INDENT}{item}")?;
        }

        writeln!(self.f, "{ARGUMENT_INDENT}]")?;

        Ok(self)
    }

    pub(crate) fn finish(self) -> fmt::Result {
        if self.paren_open {
            self.f.write_str(DIRECTIVE_INDENT)?;
            self.f.write_str(")")?;
        }

        Ok(())
    }
}

/// Writes the `extend schema` header followed by a block directive.
pub(crate) fn schema_block<'a, 'b>(
    directive_name: &str,
    f: &'a mut fmt::Formatter<'b>,
) -> Result<DirectiveBlock<'a, 'b>, fmt::Error> {
    f.write_str("extend schema\n")?;
    DirectiveBlock::new(directive_name, f)
}

/// Writes `extend schema @name(...)` on a single line.
pub(crate) fn schema_inline<'a, 'b>(
    directive_name: &str,
    f: &'a mut fmt::Formatter<'b>,
) -> Result<DirectiveWriter<'a, 'b>, fmt::Error> {
    f.write_str("extend schema ")?;
    DirectiveWriter::new(directive_name, f)
}
