//! PostgreSQL array literal codec.
//!
//! [`encode`] renders a nested [`Value`] sequence as PostgreSQL's array text
//! format (`{1,2,3}`, `{{"a","b"},{"c","d"}}`) and [`decode`] parses that
//! format back under a declared [`ArraySpec`]. Both are pure functions of
//! their inputs and may be called from any number of threads.
//!
//! Column-level wrappers [`encode_column`] and [`decode_column`] carry SQL
//! NULL through as `None`; it is never conflated with the empty array `{}`.
//!
//! # Examples
//!
//! ```
//! use pgarray_db::codec::{decode, encode};
//! use pgarray_db::fields::{ArraySpec, ElementKind};
//! use pgarray_db::value::Value;
//!
//! let spec = ArraySpec::new(ElementKind::Integer);
//! let literal = encode(&[Value::Int(1), Value::Int(2), Value::Int(3)], &spec).unwrap();
//! assert_eq!(literal, "{1,2,3}");
//! assert_eq!(decode(&literal, &spec).unwrap().len(), 3);
//! ```

mod parser;
mod scalar;

use pgarray_core::{PgArrayError, PgArrayResult};

use crate::fields::ArraySpec;
use crate::value::Value;

use self::parser::{Element, Node};
use self::scalar::LeafError;

/// Renders `value` as an array literal.
///
/// # Errors
///
/// - [`PgArrayError::ImproperlyConfigured`] if the spec itself is invalid
/// - [`PgArrayError::ShapeError`] if nesting depth, sibling lengths, or the
///   outer length disagree with the spec
/// - [`PgArrayError::RangeError`] for integers outside the kind's width
/// - [`PgArrayError::EncodingError`] for scalars of the wrong kind
pub fn encode(value: &[Value], spec: &ArraySpec) -> PgArrayResult<String> {
    spec.check()?;
    check_shape(value, spec).map_err(PgArrayError::ShapeError)?;
    check_size(value, spec).map_err(PgArrayError::ShapeError)?;

    let mut out = String::new();
    render_array(value, spec, &mut out)?;
    tracing::trace!(spec = %spec, literal = %out, "encoded array literal");
    Ok(out)
}

/// Parses an array literal into a nested [`Value`] sequence.
///
/// `{}` decodes to an empty sequence for any declared dimension.
///
/// # Errors
///
/// - [`PgArrayError::ImproperlyConfigured`] if the spec itself is invalid
/// - [`PgArrayError::DecodingError`] for malformed literals, elements that
///   are not valid for the kind, or nesting that disagrees with the spec
/// - [`PgArrayError::RangeError`] for numbers outside the kind's range
pub fn decode(literal: &str, spec: &ArraySpec) -> PgArrayResult<Vec<Value>> {
    spec.check()?;
    let nodes =
        parser::parse(literal).map_err(|reason| PgArrayError::decoding(literal, spec, reason))?;
    let values = build(nodes, 1, spec, literal)?;
    check_shape(&values, spec).map_err(|reason| PgArrayError::decoding(literal, spec, reason))?;
    tracing::trace!(spec = %spec, literal, "decoded array literal");
    Ok(values)
}

/// Encodes an optional column value; `None` (SQL NULL) stays `None`.
pub fn encode_column(value: Option<&[Value]>, spec: &ArraySpec) -> PgArrayResult<Option<String>> {
    value.map(|items| encode(items, spec)).transpose()
}

/// Decodes an optional column value; `None` (SQL NULL) stays `None`.
pub fn decode_column(literal: Option<&str>, spec: &ArraySpec) -> PgArrayResult<Option<Vec<Value>>> {
    literal.map(|text| decode(text, spec)).transpose()
}

/// Checks nesting depth and, when required, rectangularity.
///
/// Sub-array lengths are tracked per depth across the whole tree, so cousins
/// as well as siblings must agree.
pub(crate) fn check_shape(values: &[Value], spec: &ArraySpec) -> Result<(), String> {
    let mut lengths = vec![None; spec.get_dimension()];
    walk_shape(values, 1, spec, &mut lengths)
}

/// Checks the outer length against the spec's size contract, if any.
pub(crate) fn check_size(values: &[Value], spec: &ArraySpec) -> Result<(), String> {
    match spec.get_size() {
        Some(size) if values.len() > size => Err(format!(
            "array has {} elements, more than the declared size {size}",
            values.len()
        )),
        _ => Ok(()),
    }
}

fn walk_shape(
    items: &[Value],
    depth: usize,
    spec: &ArraySpec,
    lengths: &mut [Option<usize>],
) -> Result<(), String> {
    let dimension = spec.get_dimension();
    if spec.is_rectangular() && depth > 1 {
        match lengths[depth - 1] {
            Some(expected) if expected != items.len() => {
                return Err(format!(
                    "sub-arrays at depth {depth} have differing lengths ({expected} and {})",
                    items.len()
                ));
            }
            Some(_) => {}
            None => lengths[depth - 1] = Some(items.len()),
        }
    }

    for item in items {
        match item {
            Value::List(inner) if depth < dimension => {
                walk_shape(inner, depth + 1, spec, lengths)?;
            }
            Value::List(_) => {
                return Err(format!(
                    "nesting is deeper than the declared dimension {dimension}"
                ));
            }
            other if depth < dimension => {
                return Err(format!(
                    "expected a sub-array at depth {} for dimension {dimension}, found {other}",
                    depth + 1
                ));
            }
            _ => {}
        }
    }
    Ok(())
}

fn render_array(items: &[Value], spec: &ArraySpec, out: &mut String) -> PgArrayResult<()> {
    out.push('{');
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        match item {
            Value::List(inner) => render_array(inner, spec, out)?,
            scalar => scalar::render(scalar, spec.kind(), out)?,
        }
    }
    out.push('}');
    Ok(())
}

fn build(
    nodes: Vec<Node>,
    depth: usize,
    spec: &ArraySpec,
    literal: &str,
) -> PgArrayResult<Vec<Value>> {
    let dimension = spec.get_dimension();
    nodes
        .into_iter()
        .map(|node| match node {
            Node::Array(children) if depth < dimension => {
                Ok(Value::List(build(children, depth + 1, spec, literal)?))
            }
            Node::Array(_) => Err(PgArrayError::decoding(
                literal,
                spec,
                format!("nesting is deeper than the declared dimension {dimension}"),
            )),
            Node::Element(_) if depth < dimension => Err(PgArrayError::decoding(
                literal,
                spec,
                format!(
                    "expected a sub-array at depth {} for dimension {dimension}",
                    depth + 1
                ),
            )),
            Node::Element(Element::Null) => Ok(Value::Null),
            Node::Element(Element::Text(token)) => {
                scalar::parse(&token, spec.kind()).map_err(|e| match e {
                    LeafError::OutOfRange => PgArrayError::range(&token, spec.kind().name()),
                    LeafError::Invalid(reason) => PgArrayError::decoding(literal, spec, reason),
                })
            }
        })
        .collect()
}
