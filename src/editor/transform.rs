//! Catalog of pure edits over a single draft.

use crate::model::{Draft, Field, GroupBy, QueryConfig, TimeRange};

/// Every edit the query builder can make to a draft.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Transform {
    /// Pick database and retention policy; everything below them resets.
    ChooseNamespace {
        database: String,
        retention_policy: String,
    },
    /// Pick a measurement; fields, tags and tag grouping reset.
    ChooseMeasurement(String),
    AddField(Field),
    /// Remove every field with this value.
    RemoveField(String),
    ToggleField(Field),
    ApplyFunc {
        field: String,
        func: Option<String>,
    },
    GroupByTime(Option<String>),
    GroupByTag(String),
    ChooseTag {
        key: String,
        value: String,
    },
    ToggleTagAcceptance,
    Fill(Option<String>),
    SetTimeRange(Option<TimeRange>),
    EditRawText(String),
    ClearRawText,
}

impl Transform {
    pub fn name(&self) -> &'static str {
        match self {
            Transform::ChooseNamespace { .. } => "choose_namespace",
            Transform::ChooseMeasurement(_) => "choose_measurement",
            Transform::AddField(_) => "add_field",
            Transform::RemoveField(_) => "remove_field",
            Transform::ToggleField(_) => "toggle_field",
            Transform::ApplyFunc { .. } => "apply_func",
            Transform::GroupByTime(_) => "group_by_time",
            Transform::GroupByTag(_) => "group_by_tag",
            Transform::ChooseTag { .. } => "choose_tag",
            Transform::ToggleTagAcceptance => "toggle_tag_acceptance",
            Transform::Fill(_) => "fill",
            Transform::SetTimeRange(_) => "set_time_range",
            Transform::EditRawText(_) => "edit_raw_text",
            Transform::ClearRawText => "clear_raw_text",
        }
    }

    /// Whether applying twice equals applying once.
    ///
    /// Toggles and appends are not.
    pub fn is_idempotent(&self) -> bool {
        !matches!(
            self,
            Transform::AddField(_)
                | Transform::ToggleField(_)
                | Transform::GroupByTag(_)
                | Transform::ChooseTag { .. }
                | Transform::ToggleTagAcceptance
        )
    }

    pub fn apply(&self, draft: &Draft) -> Draft {
        draft.with_config(self.apply_config(draft.config()))
    }

    fn apply_config(&self, q: &QueryConfig) -> QueryConfig {
        match self {
            Transform::ChooseNamespace {
                database,
                retention_policy,
            } => QueryConfig {
                database: database.clone(),
                retention_policy: retention_policy.clone(),
                ..QueryConfig::default()
            },

            Transform::ChooseMeasurement(measurement) => QueryConfig {
                measurement: measurement.clone(),
                fields: Vec::new(),
                tags: Default::default(),
                are_tags_accepted: true,
                group_by: GroupBy {
                    time: q.group_by.time.clone(),
                    tags: Vec::new(),
                },
                ..q.clone()
            },

            Transform::AddField(field) => {
                let mut fields = q.fields.clone();
                fields.push(field.clone());
                QueryConfig {
                    fields,
                    ..q.clone()
                }
            }

            Transform::RemoveField(value) => QueryConfig {
                fields: q
                    .fields
                    .iter()
                    .filter(|f| &f.value != value)
                    .cloned()
                    .collect(),
                ..q.clone()
            },

            Transform::ToggleField(field) => {
                let present = q.fields.iter().any(|f| f.value == field.value);
                let fields = if present {
                    q.fields
                        .iter()
                        .filter(|f| f.value != field.value)
                        .cloned()
                        .collect()
                } else {
                    let mut fields = q.fields.clone();
                    fields.push(field.clone());
                    fields
                };
                QueryConfig {
                    fields,
                    ..q.clone()
                }
            }

            Transform::ApplyFunc { field, func } => QueryConfig {
                fields: q
                    .fields
                    .iter()
                    .map(|f| {
                        if &f.value == field {
                            Field {
                                func: func.clone(),
                                ..f.clone()
                            }
                        } else {
                            f.clone()
                        }
                    })
                    .collect(),
                ..q.clone()
            },

            Transform::GroupByTime(time) => QueryConfig {
                group_by: GroupBy {
                    time: time.clone(),
                    tags: q.group_by.tags.clone(),
                },
                ..q.clone()
            },

            Transform::GroupByTag(tag) => {
                let mut tags = q.group_by.tags.clone();
                if let Some(pos) = tags.iter().position(|t| t == tag) {
                    tags.remove(pos);
                } else {
                    tags.push(tag.clone());
                }
                QueryConfig {
                    group_by: GroupBy {
                        time: q.group_by.time.clone(),
                        tags,
                    },
                    ..q.clone()
                }
            }

            Transform::ChooseTag { key, value } => {
                let mut tags = q.tags.clone();
                let values = tags.entry(key.clone()).or_default();
                if let Some(pos) = values.iter().position(|v| v == value) {
                    values.remove(pos);
                } else {
                    values.push(value.clone());
                }
                if values.is_empty() {
                    tags.remove(key);
                }
                QueryConfig { tags, ..q.clone() }
            }

            Transform::ToggleTagAcceptance => QueryConfig {
                are_tags_accepted: !q.are_tags_accepted,
                ..q.clone()
            },

            Transform::Fill(fill) => QueryConfig {
                fill: fill.clone(),
                ..q.clone()
            },

            Transform::SetTimeRange(range) => QueryConfig {
                range: range.clone(),
                ..q.clone()
            },

            Transform::EditRawText(text) => QueryConfig {
                raw_text: Some(text.clone()),
                ..q.clone()
            },

            Transform::ClearRawText => QueryConfig {
                raw_text: None,
                ..q.clone()
            },
        }
    }
}

#[cfg(test)]
#[path = "../tests/editor/transform_tests.rs"]
mod tests;
