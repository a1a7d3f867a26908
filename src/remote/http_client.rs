use super::*;

impl HttpParseService {
    pub(super) fn ensure_ok(
        &self,
        resp: reqwest::blocking::Response,
        label: &str,
    ) -> Result<reqwest::blocking::Response> {
        if resp.status() == reqwest::StatusCode::BAD_REQUEST {
            let v: ServiceError = resp
                .json()
                .with_context(|| format!("{} error body", label))?;
            anyhow::bail!("{}: {}", label, v.message);
        }
        if resp.status() == reqwest::StatusCode::UNAUTHORIZED
            || resp.status() == reqwest::StatusCode::FORBIDDEN
        {
            anyhow::bail!("{}: not authorized for this source", label);
        }
        resp.error_for_status()
            .with_context(|| format!("{} status", label))
    }

    pub(super) fn url(&self, endpoint: &str) -> Result<String> {
        if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
            return Ok(endpoint.to_string());
        }
        match &self.base_url {
            Some(base) => Ok(format!("{}{}", base, endpoint)),
            None => anyhow::bail!(
                "relative parse endpoint {} needs a parser base url (--parser-url)",
                endpoint
            ),
        }
    }
}
