//! Dotted JSON paths such as `order.items[0].id` or `order.items.0.id`.

use anyhow::{anyhow, bail};
use serde_json::Value;

#[derive(Debug, PartialEq, Eq)]
enum Segment<'p> {
    Key(&'p str),
    Index(usize),
}

/// Resolves `path` inside `value`. An empty path or `.` addresses the root.
pub fn lookup<'v>(value: &'v Value, path: &str) -> anyhow::Result<&'v Value> {
    segments(path)?
        .into_iter()
        .try_fold(value, |current, segment| {
            step(current, &segment).ok_or_else(|| anyhow!("json path {path:?} not found"))
        })
}

fn step<'v>(value: &'v Value, segment: &Segment<'_>) -> Option<&'v Value> {
    match (segment, value) {
        (Segment::Key(key), Value::Object(map)) => map.get(*key),
        (Segment::Key(key), Value::Array(items)) => {
            key.parse::<usize>().ok().and_then(|i| items.get(i))
        }
        (Segment::Index(i), Value::Array(items)) => items.get(*i),
        _ => None,
    }
}

fn segments(path: &str) -> anyhow::Result<Vec<Segment<'_>>> {
    let mut out = Vec::new();

    for part in path.split('.').filter(|p| !p.is_empty()) {
        let (key, mut rest) = match part.find('[') {
            Some(pos) => part.split_at(pos),
            None => (part, ""),
        };
        if !key.is_empty() {
            out.push(Segment::Key(key));
        }

        while !rest.is_empty() {
            if !rest.starts_with('[') {
                bail!("unexpected {rest:?} in json path {path:?}");
            }
            let Some(close) = rest.find(']') else {
                bail!("unclosed '[' in json path {path:?}");
            };
            let index = rest[1..close]
                .trim()
                .parse::<usize>()
                .map_err(|_| anyhow!("invalid index {:?} in json path {path:?}", &rest[1..close]))?;
            out.push(Segment::Index(index));
            rest = &rest[close + 1..];
        }
    }

    Ok(out)
}
