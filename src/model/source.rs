use serde::{Deserialize, Serialize};

/// Opaque reference to a data source: the source's `links.self` value.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceLink(pub String);

impl SourceLink {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub id: String,
    pub name: String,
    pub url: String,
    pub links: SourceLinks,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLinks {
    #[serde(rename = "self")]
    pub self_link: String,
    /// Endpoint that turns raw query text into query configs.
    pub queries: String,
}

impl Source {
    pub fn link(&self) -> SourceLink {
        SourceLink(self.links.self_link.clone())
    }

    /// Label shown in the source selector.
    pub fn label(&self) -> String {
        format!("{} @ {}", self.name, self.url)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub temp_var: String,
    #[serde(default)]
    pub values: Vec<TemplateValue>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateValue {
    pub value: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub selected: bool,
}

impl Template {
    /// Value substituted for this variable, if one is selected.
    pub fn selected_value(&self) -> Option<&str> {
        self.values
            .iter()
            .find(|v| v.selected)
            .map(|v| v.value.as_str())
    }
}

/// Templates reduced to their selected values, as sent to the parse service.
pub fn selected_template_values(templates: &[Template]) -> Vec<Template> {
    templates
        .iter()
        .map(|t| Template {
            temp_var: t.temp_var.clone(),
            values: t.values.iter().filter(|v| v.selected).cloned().collect(),
        })
        .collect()
}
