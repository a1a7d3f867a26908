use anyhow::{Context, Result};

use super::split::{find_top_level, split_top_level, unquote};
use crate::model::{DASHBOARD_TIME, Field, GroupBy, QueryConfig, Template, TimeRange};

/// Replace every template variable with its selected value.
pub fn substitute_templates(text: &str, templates: &[Template]) -> String {
    let mut out = text.to_string();
    for t in templates {
        if let Some(v) = t.selected_value() {
            out = out.replace(&t.temp_var, v);
        }
    }
    out
}

/// Convert a simple InfluxQL SELECT into a structured config.
///
/// Statements outside the subset the query builder can express
/// (subqueries, ORDER BY, LIMIT, mixed tag operators, ...) are rejected.
pub fn parse_query(text: &str) -> Result<QueryConfig> {
    let text = text.trim().trim_end_matches(';').trim();
    let Some(rest) = strip_keyword(text, "SELECT ") else {
        anyhow::bail!("not a SELECT statement");
    };

    let from_at = *find_top_level(rest, " FROM ")
        .first()
        .context("missing FROM clause")?;
    let fields_part = &rest[..from_at];
    let after_from = &rest[from_at + " FROM ".len()..];

    let (source_part, where_part, group_part, fill_part) = clauses(after_from)?;

    let mut config = QueryConfig {
        fields: parse_fields(fields_part)?,
        ..QueryConfig::default()
    };
    parse_source(source_part, &mut config)?;
    if let Some(w) = where_part {
        parse_where(w, &mut config)?;
    }
    if let Some(g) = group_part {
        config.group_by = parse_group_by(g)?;
    }
    if let Some(f) = fill_part {
        config.fill = Some(f.to_string());
    }
    Ok(config)
}

fn strip_keyword<'a>(s: &'a str, kw: &str) -> Option<&'a str> {
    s.get(..kw.len())
        .filter(|head| head.eq_ignore_ascii_case(kw))
        .map(|_| &s[kw.len()..])
}

type Clauses<'a> = (&'a str, Option<&'a str>, Option<&'a str>, Option<&'a str>);

fn clauses(s: &str) -> Result<Clauses<'_>> {
    for kw in [" LIMIT ", " ORDER BY ", " SLIMIT ", " OFFSET ", " INTO "] {
        if !find_top_level(s, kw).is_empty() {
            anyhow::bail!("unsupported clause {}", kw.trim());
        }
    }

    let at = |kw: &str| find_top_level(s, kw).first().copied();
    let where_at = at(" WHERE ");
    let group_at = at(" GROUP BY ");
    let fill_at = at(" FILL(");

    let marks = [where_at, group_at, fill_at];

    let source_end = marks
        .into_iter()
        .flatten()
        .min()
        .unwrap_or(s.len());
    let source = s[..source_end].trim();

    let where_part = clause_body(s, where_at, " WHERE ", &marks)?.map(str::trim);
    let group_part = clause_body(s, group_at, " GROUP BY ", &marks)?.map(str::trim);
    let fill_part = match clause_body(s, fill_at, " FILL(", &marks)? {
        Some(inner) => {
            let Some(close) = inner.rfind(')') else {
                anyhow::bail!("unterminated FILL");
            };
            Some(inner[..close].trim())
        }
        None => None,
    };

    Ok((source, where_part, group_part, fill_part))
}

/// Text between keyword `kw` at `at` and the next keyword in `marks`.
///
/// Keywords share their surrounding spaces, so a clause with no body has the
/// next keyword starting inside its own.
fn clause_body<'a>(
    s: &'a str,
    at: Option<usize>,
    kw: &str,
    marks: &[Option<usize>],
) -> Result<Option<&'a str>> {
    let Some(i) = at else {
        return Ok(None);
    };
    let start = i + kw.len();
    let end = marks
        .iter()
        .flatten()
        .copied()
        .filter(|&j| j > i)
        .min()
        .unwrap_or(s.len());
    if end < start {
        anyhow::bail!("empty {} clause", kw.trim().trim_end_matches('('));
    }
    Ok(Some(&s[start..end]))
}

fn parse_fields(s: &str) -> Result<Vec<Field>> {
    let mut out = Vec::new();
    for part in split_top_level(s, ",") {
        if part.is_empty() {
            anyhow::bail!("empty field expression");
        }
        let pieces = split_top_level(part, " AS ");
        let (expr, alias) = match pieces.as_slice() {
            [e] => (*e, None),
            [e, a] => (*e, Some(unquote(a))),
            _ => anyhow::bail!("malformed field expression: {}", part),
        };

        let field = match expr.find('(') {
            Some(open) if expr.ends_with(')') => {
                let func = expr[..open].trim();
                let arg = expr[open + 1..expr.len() - 1].trim();
                if func.is_empty() || arg.contains('(') || arg.contains(',') {
                    anyhow::bail!("unsupported field expression: {}", expr);
                }
                Field {
                    value: unquote(arg),
                    alias: alias.filter(|a| *a != format!("{}_{}", func, unquote(arg))),
                    func: Some(func.to_ascii_lowercase()),
                }
            }
            Some(_) => anyhow::bail!("unsupported field expression: {}", expr),
            None => Field {
                value: unquote(expr),
                alias,
                func: None,
            },
        };
        out.push(field);
    }
    Ok(out)
}

fn parse_source(s: &str, config: &mut QueryConfig) -> Result<()> {
    if s.starts_with('(') {
        anyhow::bail!("subqueries are not supported");
    }
    let parts: Vec<String> = split_top_level(s, ".").into_iter().map(unquote).collect();
    match parts.as_slice() {
        [m] => config.measurement = m.clone(),
        [rp, m] => {
            config.retention_policy = rp.clone();
            config.measurement = m.clone();
        }
        [db, rp, m] => {
            config.database = db.clone();
            config.retention_policy = rp.clone();
            config.measurement = m.clone();
        }
        _ => anyhow::bail!("malformed FROM clause: {}", s),
    }
    if config.measurement.is_empty() {
        anyhow::bail!("missing measurement");
    }
    Ok(())
}

fn parse_where(s: &str, config: &mut QueryConfig) -> Result<()> {
    let mut lower: Option<String> = None;
    let mut upper: Option<String> = None;
    let mut accepted: Option<bool> = None;

    for cond in split_top_level(s, " AND ") {
        if let Some(rest) = strip_keyword(cond, "time")
            .map(str::trim_start)
            .filter(|r| r.starts_with('>') || r.starts_with('<'))
        {
            let (op, expr) = if let Some(e) = rest.strip_prefix(">=") {
                (">", e)
            } else if let Some(e) = rest.strip_prefix('>') {
                (">", e)
            } else if let Some(e) = rest.strip_prefix("<=") {
                ("<", e)
            } else if let Some(e) = rest.strip_prefix('<') {
                ("<", e)
            } else {
                anyhow::bail!("unsupported time condition: {}", cond);
            };
            let expr = unquote(expr);
            if op == ">" {
                lower = Some(expr);
            } else {
                upper = Some(expr);
            }
            continue;
        }

        let inner = cond
            .strip_prefix('(')
            .and_then(|c| c.strip_suffix(')'))
            .unwrap_or(cond);
        let or_parts = split_top_level(inner, " OR ");
        let and_parts = split_top_level(inner, " AND ");
        let parts = if or_parts.len() >= and_parts.len() {
            or_parts
        } else {
            and_parts
        };

        for p in parts {
            let (key, value, is_accept) = parse_tag_condition(p)?;
            match accepted {
                Some(a) if a != is_accept => anyhow::bail!("mixed tag operators"),
                _ => accepted = Some(is_accept),
            }
            let values = config.tags.entry(key).or_default();
            if !values.contains(&value) {
                values.push(value);
            }
        }
    }

    config.are_tags_accepted = accepted.unwrap_or(true);
    config.range = match (lower, upper) {
        (None, None) => None,
        (Some(l), None) if l == DASHBOARD_TIME => None,
        (Some(l), u) => Some(TimeRange { lower: l, upper: u }),
        (None, Some(_)) => anyhow::bail!("upper time bound without lower bound"),
    };
    Ok(())
}

fn parse_tag_condition(s: &str) -> Result<(String, String, bool)> {
    let (at, is_accept, op_len) = match find_top_level(s, "!=").first() {
        Some(&i) => (i, false, 2),
        None => match find_top_level(s, "=").first() {
            Some(&i) => (i, true, 1),
            None => anyhow::bail!("unsupported condition: {}", s),
        },
    };
    let key = unquote(&s[..at]);
    let value = unquote(&s[at + op_len..]);
    if key.is_empty() {
        anyhow::bail!("unsupported condition: {}", s);
    }
    Ok((key, value, is_accept))
}

fn parse_group_by(s: &str) -> Result<GroupBy> {
    let mut group = GroupBy::default();
    for part in split_top_level(s, ",") {
        if let Some(rest) = strip_keyword(part, "time(") {
            let interval = rest
                .strip_suffix(')')
                .context("unterminated time() in GROUP BY")?
                .trim();
            group.time = Some(if interval == ":interval:" {
                "auto".to_string()
            } else {
                interval.to_string()
            });
        } else if part.is_empty() || part.contains('(') {
            anyhow::bail!("unsupported GROUP BY term: {}", part);
        } else {
            group.tags.push(unquote(part));
        }
    }
    Ok(group)
}
