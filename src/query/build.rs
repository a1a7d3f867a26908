use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::model::{Field, QueryConfig, TimeRange};

/// Group-by interval that the dashboard fills in.
const AUTO_INTERVAL: &str = "auto";

/// Render a structured query as InfluxQL.
///
/// Returns an empty string when the config lacks a database, a measurement,
/// or any field, since no valid statement exists for it.
pub fn build_query(config: &QueryConfig, range: &TimeRange) -> String {
    if config.database.is_empty() || config.measurement.is_empty() || config.fields.is_empty() {
        return String::new();
    }

    let fields: Vec<String> = config.fields.iter().map(select_field).collect();
    let mut q = format!(
        "SELECT {} FROM \"{}\".{}.\"{}\"",
        fields.join(", "),
        config.database,
        quote_optional(&config.retention_policy),
        config.measurement
    );

    q.push_str(&format!(" WHERE time > {}", time_bound(&range.lower)));
    if let Some(upper) = range.upper.as_deref() {
        q.push_str(&format!(" AND time < {}", time_bound(upper)));
    }
    for clause in tag_clauses(config) {
        q.push_str(" AND ");
        q.push_str(&clause);
    }

    let mut groups = Vec::new();
    if let Some(t) = config.group_by.time.as_deref() {
        if t == AUTO_INTERVAL {
            groups.push("time(:interval:)".to_string());
        } else {
            groups.push(format!("time({})", t));
        }
    }
    for tag in &config.group_by.tags {
        groups.push(format!("\"{}\"", tag));
    }
    if !groups.is_empty() {
        q.push_str(" GROUP BY ");
        q.push_str(&groups.join(", "));
    }

    // FILL only applies to time buckets.
    if config.group_by.time.is_some()
        && let Some(fill) = config.fill.as_deref()
    {
        q.push_str(&format!(" FILL({})", fill));
    }

    q
}

fn select_field(f: &Field) -> String {
    match f.func.as_deref() {
        Some(func) => {
            let arg = if f.value == "*" {
                "*".to_string()
            } else {
                format!("\"{}\"", f.value)
            };
            let alias = f
                .alias
                .clone()
                .unwrap_or_else(|| format!("{}_{}", func, f.value.replace('*', "all")));
            format!("{}({}) AS \"{}\"", func, arg, alias)
        }
        None if f.value == "*" => "*".to_string(),
        None => match f.alias.as_deref() {
            Some(a) => format!("\"{}\" AS \"{}\"", f.value, a),
            None => format!("\"{}\"", f.value),
        },
    }
}

fn quote_optional(s: &str) -> String {
    if s.is_empty() {
        String::new()
    } else {
        format!("\"{}\"", s)
    }
}

fn time_bound(expr: &str) -> String {
    if OffsetDateTime::parse(expr, &Rfc3339).is_ok() {
        format!("'{}'", expr)
    } else {
        expr.to_string()
    }
}

fn tag_clauses(config: &QueryConfig) -> Vec<String> {
    let (op, join) = if config.are_tags_accepted {
        ("=", " OR ")
    } else {
        ("!=", " AND ")
    };

    config
        .tags
        .iter()
        .filter(|(_, values)| !values.is_empty())
        .map(|(key, values)| {
            let parts: Vec<String> = values
                .iter()
                .map(|v| format!("\"{}\"{}'{}'", key, op, v.replace('\'', "\\'")))
                .collect();
            format!("({})", parts.join(join))
        })
        .collect()
}
