// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Declared types and the annotation-string parser.

use crate::error::SchemaError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A declared type, as written on a parameter, result, property, or field.
///
/// Serialized as its annotation text (`"list[int]"`, `"str | None"`), so JSON
/// schemas read the way the annotations were written.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TypeRef {
    /// Accepts anything.
    Any,
    /// The type of the "no value" marker.
    NoneType,
    /// `bool`
    Bool,
    /// `int`
    Int,
    /// `float`
    Float,
    /// `str`
    Str,
    /// `list[T]`
    List(Box<TypeRef>),
    /// `tuple[A, B, ..]`; an empty element list accepts any tuple.
    Tuple(Vec<TypeRef>),
    /// `set[T]`
    Set(Box<TypeRef>),
    /// `dict[K, V]`
    Map(Box<TypeRef>, Box<TypeRef>),
    /// `A | B | ..`; matches when any alternative matches.
    Union(Vec<TypeRef>),
    /// A user-named type, matched by object type name.
    Named(String),
}

impl TypeRef {
    /// `list[T]`
    pub fn list(item: TypeRef) -> Self {
        Self::List(Box::new(item))
    }

    /// `set[T]`
    pub fn set(item: TypeRef) -> Self {
        Self::Set(Box::new(item))
    }

    /// `dict[K, V]`
    pub fn map(key: TypeRef, value: TypeRef) -> Self {
        Self::Map(Box::new(key), Box::new(value))
    }

    /// `Optional[T]`, i.e. `T | None`.
    pub fn optional(inner: TypeRef) -> Self {
        Self::union([inner, Self::NoneType])
    }

    /// Union of the given alternatives.
    ///
    /// Nested unions are flattened, duplicates dropped, and a single remaining
    /// alternative is returned unwrapped.
    pub fn union<I: IntoIterator<Item = TypeRef>>(alternatives: I) -> Self {
        let mut flat: Vec<TypeRef> = Vec::new();
        for alt in alternatives {
            let parts = match alt {
                Self::Union(inner) => inner,
                other => vec![other],
            };
            for part in parts {
                if !flat.contains(&part) {
                    flat.push(part);
                }
            }
        }
        if flat.len() == 1 {
            flat.remove(0)
        } else {
            Self::Union(flat)
        }
    }

    /// A user-named type.
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }

    /// Returns `true` if `None` is one of the accepted alternatives.
    pub fn is_optional(&self) -> bool {
        match self {
            Self::NoneType | Self::Any => true,
            Self::Union(alts) => alts.iter().any(Self::is_optional),
            _ => false,
        }
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, items: &[TypeRef], sep: &str) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(sep)?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str("Any"),
            Self::NoneType => f.write_str("None"),
            Self::Bool => f.write_str("bool"),
            Self::Int => f.write_str("int"),
            Self::Float => f.write_str("float"),
            Self::Str => f.write_str("str"),
            Self::List(item) => write!(f, "list[{item}]"),
            Self::Tuple(items) if items.is_empty() => f.write_str("tuple"),
            Self::Tuple(items) => {
                f.write_str("tuple[")?;
                write_list(f, items, ", ")?;
                f.write_str("]")
            }
            Self::Set(item) => write!(f, "set[{item}]"),
            Self::Map(k, v) => write!(f, "dict[{k}, {v}]"),
            Self::Union(alts) => write_list(f, alts, " | "),
            Self::Named(name) => f.write_str(name),
        }
    }
}

impl From<TypeRef> for String {
    fn from(ty: TypeRef) -> Self {
        ty.to_string()
    }
}

impl TryFrom<String> for TypeRef {
    type Error = SchemaError;

    fn try_from(text: String) -> Result<Self, Self::Error> {
        text.parse()
    }
}

impl FromStr for TypeRef {
    type Err = SchemaError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let mut parser = Parser {
            input: text,
            pos: 0,
        };
        let ty = parser.union()?;
        parser.skip_ws();
        if parser.pos != text.len() {
            return Err(parser.error("unexpected trailing input"));
        }
        Ok(ty)
    }
}

fn take_or_any(args: &mut Vec<TypeRef>) -> TypeRef {
    if args.is_empty() {
        TypeRef::Any
    } else {
        args.remove(0)
    }
}

/// Recursive-descent parser over annotation text.
///
/// ```text
/// union := atom ('|' atom)*
/// atom  := quoted | ident ('[' arg (',' arg)* ']')?
/// arg   := union | '[' arg (',' arg)* ']' | '...'
/// ```
///
/// `Literal[..]` arguments are skipped verbatim.
struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl Parser<'_> {
    fn error(&self, reason: &str) -> SchemaError {
        SchemaError::TypeSyntax {
            input: self.input.to_owned(),
            position: self.pos,
            reason: reason.to_owned(),
        }
    }

    fn check_arity(&self, args: &[TypeRef], max: usize) -> Result<(), SchemaError> {
        if args.len() > max {
            Err(self.error("too many type arguments"))
        } else {
            Ok(())
        }
    }

    fn skip_ws(&mut self) {
        let rest = &self.input[self.pos..];
        self.pos += rest.len() - rest.trim_start().len();
    }

    fn peek(&mut self) -> Option<char> {
        self.skip_ws();
        self.input[self.pos..].chars().next()
    }

    fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.pos += c.len_utf8();
            true
        } else {
            false
        }
    }

    fn union(&mut self) -> Result<TypeRef, SchemaError> {
        let mut alts = vec![self.atom()?];
        while self.eat('|') {
            alts.push(self.atom()?);
        }
        Ok(TypeRef::union(alts))
    }

    fn ident(&mut self) -> Result<&str, SchemaError> {
        self.skip_ws();
        let start = self.pos;
        let rest = &self.input[start..];
        let len = rest
            .char_indices()
            .find(|(_, c)| !(c.is_alphanumeric() || *c == '_' || *c == '.'))
            .map_or(rest.len(), |(i, _)| i);
        if len == 0 {
            return Err(self.error("expected a type name"));
        }
        self.pos += len;
        Ok(&self.input[start..start + len])
    }

    fn args(&mut self) -> Result<Vec<TypeRef>, SchemaError> {
        if !self.eat('[') {
            return Ok(Vec::new());
        }
        let mut args = Vec::new();
        if self.eat(']') {
            return Ok(args);
        }
        loop {
            if self.peek() == Some('[') {
                // `Callable[[int], str]`: a parameter list, kept only as a shape.
                self.args()?;
                args.push(TypeRef::Any);
            } else if self.eat('.') {
                // `tuple[int, ...]`: homogeneous tuple, treated as any tuple.
                while self.eat('.') {}
                args.clear();
            } else {
                args.push(self.union()?);
            }
            if self.eat(']') {
                return Ok(args);
            }
            if !self.eat(',') {
                return Err(self.error("expected ',' or ']'"));
            }
        }
    }

    /// Skip a bracketed argument list verbatim, quotes included.
    fn skip_args(&mut self) -> Result<(), SchemaError> {
        if !self.eat('[') {
            return Ok(());
        }
        let mut depth = 1usize;
        let mut quote = None;
        for (i, c) in self.input[self.pos..].char_indices() {
            match (quote, c) {
                (Some(q), c) if c == q => quote = None,
                (Some(_), _) => {}
                (None, '\'' | '"') => quote = Some(c),
                (None, '[') => depth += 1,
                (None, ']') => {
                    depth -= 1;
                    if depth == 0 {
                        self.pos += i + 1;
                        return Ok(());
                    }
                }
                (None, _) => {}
            }
        }
        self.pos = self.input.len();
        Err(self.error("unterminated type arguments"))
    }

    fn quoted(&mut self, quote: char) -> Result<TypeRef, SchemaError> {
        self.pos += quote.len_utf8();
        let start = self.pos;
        let Some(len) = self.input[start..].find(quote) else {
            return Err(self.error("unterminated quoted annotation"));
        };
        self.pos += len + quote.len_utf8();
        self.input[start..start + len].parse()
    }

    fn atom(&mut self) -> Result<TypeRef, SchemaError> {
        if let Some(q @ ('"' | '\'')) = self.peek() {
            return self.quoted(q);
        }
        let name = self.ident()?.to_owned();
        let bare = name.rsplit('.').next().unwrap_or(&name).to_owned();
        if bare == "Literal" {
            // Literal arguments are values, not types.
            self.skip_args()?;
            return Ok(TypeRef::Any);
        }
        let mut args = self.args()?;
        let ty = match bare.as_str() {
            "Any" | "object" => TypeRef::Any,
            "None" | "NoneType" => TypeRef::NoneType,
            "bool" => TypeRef::Bool,
            "int" => TypeRef::Int,
            "float" => TypeRef::Float,
            "str" => TypeRef::Str,
            "list" | "List" | "Sequence" | "MutableSequence" => {
                self.check_arity(&args, 1)?;
                TypeRef::list(take_or_any(&mut args))
            }
            "set" | "Set" | "frozenset" | "FrozenSet" | "AbstractSet" => {
                self.check_arity(&args, 1)?;
                TypeRef::set(take_or_any(&mut args))
            }
            "dict" | "Dict" | "Mapping" | "MutableMapping" => {
                self.check_arity(&args, 2)?;
                let k = take_or_any(&mut args);
                let v = take_or_any(&mut args);
                TypeRef::map(k, v)
            }
            "tuple" | "Tuple" => TypeRef::Tuple(args),
            "Optional" => {
                if args.len() != 1 {
                    return Err(self.error("Optional takes exactly one type argument"));
                }
                TypeRef::optional(args.remove(0))
            }
            "Union" => {
                if args.is_empty() {
                    return Err(self.error("Union needs at least one type argument"));
                }
                TypeRef::union(args)
            }
            "Iterable" | "Iterator" | "Collection" | "Container" | "Reversible" | "Generator"
            | "AsyncIterable" | "AsyncIterator" | "AsyncGenerator" | "Awaitable" | "Coroutine"
            | "Callable" | "Hashable" | "Sized" | "type" | "Type" => TypeRef::Any,
            "Annotated" | "Final" | "ClassVar" | "Required" | "NotRequired" | "ReadOnly" => {
                take_or_any(&mut args)
            }
            // Other generics are checked by their base name only.
            _ => TypeRef::Named(name),
        };
        Ok(ty)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn parse(text: &str) -> TypeRef {
        text.parse().unwrap()
    }

    #[test]
    fn parses_primitives_and_containers() {
        assert_eq!(parse("int"), TypeRef::Int);
        assert_eq!(parse("list[str]"), TypeRef::list(TypeRef::Str));
        assert_eq!(parse("List"), TypeRef::list(TypeRef::Any));
        assert_eq!(
            parse("dict[str, list[float]]"),
            TypeRef::map(TypeRef::Str, TypeRef::list(TypeRef::Float))
        );
        assert_eq!(
            parse("tuple[int, str]"),
            TypeRef::Tuple(vec![TypeRef::Int, TypeRef::Str])
        );
        assert_eq!(parse("tuple[int, ...]"), TypeRef::Tuple(vec![]));
    }

    #[test]
    fn optional_spellings_agree() {
        let expected = TypeRef::optional(TypeRef::Int);
        assert_eq!(parse("Optional[int]"), expected);
        assert_eq!(parse("int | None"), expected);
        assert_eq!(parse("Union[int, None]"), expected);
        assert_eq!(parse("typing.Optional[int]"), expected);
        assert!(expected.is_optional());
    }

    #[test]
    fn quoted_forward_references_resolve() {
        assert_eq!(parse("'int'"), TypeRef::Int);
        assert_eq!(parse("\"Point\""), TypeRef::named("Point"));
        assert_eq!(parse("list['Point']"), TypeRef::list(TypeRef::named("Point")));
    }

    #[test]
    fn union_flattens_and_dedupes() {
        assert_eq!(parse("int | int"), TypeRef::Int);
        assert_eq!(
            parse("Union[int, Union[str, int]]"),
            TypeRef::Union(vec![TypeRef::Int, TypeRef::Str])
        );
    }

    #[test]
    fn display_round_trips() {
        for text in ["int", "list[str]", "dict[str, int]", "int | None", "tuple", "Point"] {
            assert_eq!(parse(text).to_string(), text);
        }
    }

    #[test]
    fn protocol_and_special_generics_are_accepted() {
        assert_eq!(parse("Iterable[int]"), TypeRef::Any);
        assert_eq!(parse("typing.Iterator[str]"), TypeRef::Any);
        assert_eq!(parse("type[Point]"), TypeRef::Any);
        assert_eq!(parse("Callable[[int, str], bool]"), TypeRef::Any);
        assert_eq!(parse("Callable[..., None]"), TypeRef::Any);
        assert_eq!(parse("Literal['a', \"b]\", 3]"), TypeRef::Any);
        assert_eq!(parse("Annotated[int, 'meta']"), TypeRef::Int);
        assert_eq!(parse("Optional[Iterable[int]]"), TypeRef::optional(TypeRef::Any));
    }

    #[test]
    fn unknown_generics_keep_their_base_name() {
        assert_eq!(parse("Box[int]"), TypeRef::named("Box"));
        assert_eq!(parse("geo.Grid[int, [str]]"), TypeRef::named("geo.Grid"));
        assert!("Literal['a'".parse::<TypeRef>().is_err());
    }

    #[test]
    fn syntax_errors_report_position() {
        let err = "list[int".parse::<TypeRef>().unwrap_err();
        assert!(matches!(err, SchemaError::TypeSyntax { position: 8, .. }));
        assert!("Optional[int, str]".parse::<TypeRef>().is_err());
        assert!("int]".parse::<TypeRef>().is_err());
        assert!("".parse::<TypeRef>().is_err());
    }
}
