// Props assembly: body, query and path parameters merged into one object

use crate::routing::{decode_segment, Params};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// The merged parameter object handed to handlers.
pub type Props = Map<String, Value>;

/// Merge body, query and path parameters.
///
/// Path params identify the resource, so they win over query parameters,
/// which win over body fields.
pub fn merge_props(body: Props, query: &Props, path: &Params) -> Props {
    let mut props = body;
    for (key, value) in query {
        props.insert(key.clone(), value.clone());
    }
    for (key, value) in path {
        props.insert(key.clone(), Value::String(value.clone()));
    }
    props
}

/// Convert query string parameters into props.
pub fn query_props(query: Option<&HashMap<String, String>>) -> Props {
    query
        .into_iter()
        .flatten()
        .map(|(key, value)| (key.clone(), Value::String(value.clone())))
        .collect()
}

/// Map a positional template such as `x/:name/:other` onto path segments.
///
/// Only `:name` positions bind, and only when the request has a segment at
/// that position.
pub fn path_to_props(template: &str, segments: &[&str]) -> Params {
    let template = template.strip_prefix('/').unwrap_or(template);
    template
        .split('/')
        .enumerate()
        .filter_map(|(index, part)| {
            let name = part.strip_prefix(':')?;
            let value = segments.get(index)?;
            Some((name.to_string(), decode_segment(value).into_owned()))
        })
        .collect()
}
