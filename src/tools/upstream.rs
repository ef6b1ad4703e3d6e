use std::fmt;

/// IBGE services reached by the tool layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UpstreamApi {
    /// States, municipalities and other territorial units.
    Localidades,
    /// SIDRA aggregate tables.
    Sidra,
    /// Name frequency from the census.
    Nomes,
    /// News and releases.
    Noticias,
    /// Geographic meshes.
    Malhas,
}

impl UpstreamApi {
    pub const ALL: [UpstreamApi; 5] = [
        UpstreamApi::Localidades,
        UpstreamApi::Sidra,
        UpstreamApi::Nomes,
        UpstreamApi::Noticias,
        UpstreamApi::Malhas,
    ];

    /// Label used for per-API metrics.
    pub fn name(self) -> &'static str {
        match self {
            UpstreamApi::Localidades => "localidades",
            UpstreamApi::Sidra => "sidra",
            UpstreamApi::Nomes => "nomes",
            UpstreamApi::Noticias => "noticias",
            UpstreamApi::Malhas => "malhas",
        }
    }

    pub fn base_url(self) -> &'static str {
        match self {
            UpstreamApi::Localidades => "https://servicodados.ibge.gov.br/api/v1/localidades",
            UpstreamApi::Sidra => "https://apisidra.ibge.gov.br/values",
            UpstreamApi::Nomes => "https://servicodados.ibge.gov.br/api/v2/censos/nomes",
            UpstreamApi::Noticias => "https://servicodados.ibge.gov.br/api/v3/noticias",
            UpstreamApi::Malhas => "https://servicodados.ibge.gov.br/api/v3/malhas",
        }
    }

    /// `base_url` joined with `path`, with exactly one slash between them.
    pub fn endpoint(self, path: &str) -> String {
        let path = path.trim_start_matches('/');
        if path.is_empty() {
            self.base_url().to_string()
        } else {
            format!("{}/{}", self.base_url(), path)
        }
    }
}

impl fmt::Display for UpstreamApi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_are_unique() {
        let mut names: Vec<&str> = UpstreamApi::ALL.iter().map(|a| a.name()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), UpstreamApi::ALL.len());
    }

    #[test]
    fn test_endpoint_join() {
        assert_eq!(
            UpstreamApi::Localidades.endpoint("/estados"),
            "https://servicodados.ibge.gov.br/api/v1/localidades/estados"
        );
        assert_eq!(
            UpstreamApi::Nomes.endpoint("maria"),
            "https://servicodados.ibge.gov.br/api/v2/censos/nomes/maria"
        );
        assert_eq!(UpstreamApi::Malhas.endpoint(""), UpstreamApi::Malhas.base_url());
    }
}
