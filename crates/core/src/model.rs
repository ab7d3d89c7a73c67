use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::constants::{DEFAULT_COUNTRY, FALLBACK_COMPANY_NAME};
use crate::error::{CoreError, Result};
use crate::normalize::{
    extract_domain, normalize_cnpj, normalize_email, normalize_phone, normalize_text,
    normalize_uf, normalize_website,
};
use crate::text::fold;

/// A raw spreadsheet row: header → cell.
pub type RawRow = Map<String, Value>;

/// Closed set of fields a spreadsheet column can be mapped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CanonicalField {
    CompanyName,
    Cnpj,
    Website,
    Sector,
    Uf,
    City,
    Country,
    ContactName,
    ContactRole,
    ContactEmail,
    ContactPhone,
    LinkedinUrl,
    Notes,
}

impl CanonicalField {
    pub const ALL: [Self; 13] = [
        Self::CompanyName,
        Self::Cnpj,
        Self::Website,
        Self::Sector,
        Self::Uf,
        Self::City,
        Self::Country,
        Self::ContactName,
        Self::ContactRole,
        Self::ContactEmail,
        Self::ContactPhone,
        Self::LinkedinUrl,
        Self::Notes,
    ];

    /// Accepted mapping keys, most preferred first. The first entry is the canonical name.
    pub fn synonyms(self) -> &'static [&'static str] {
        match self {
            Self::CompanyName => &["companyName", "razao_social", "nome_fantasia", "nome_da_empresa"],
            Self::Cnpj => &["cnpj"],
            Self::Website => &["website", "site"],
            Self::Sector => &["sector", "setor"],
            Self::Uf => &["uf", "estado"],
            Self::City => &["city", "cidade", "municipio"],
            Self::Country => &["country", "pais"],
            Self::ContactName => &["contactName", "contato_nome", "decisor_1_nome"],
            Self::ContactRole => &["contactRole", "contato_cargo", "decisor_1_cargo"],
            Self::ContactEmail => &["contactEmail", "contato_email", "decisor_1_email"],
            Self::ContactPhone => &["contactPhone", "contato_telefone", "decisor_1_telefone"],
            Self::LinkedinUrl => &["linkedinUrl", "linkedin", "decisor_1_linkedin"],
            Self::Notes => &["notes", "observacoes", "notas"],
        }
    }

    pub fn as_str(self) -> &'static str {
        self.synonyms().first().copied().unwrap_or_default()
    }

    /// Resolves a mapping key to its field and synonym rank (0 = canonical name).
    pub fn resolve(key: &str) -> Option<(Self, usize)> {
        Self::ALL.into_iter().find_map(|field| {
            field.synonyms().iter().position(|s| *s == key).map(|rank| (field, rank))
        })
    }

    /// Like [`Self::resolve`] but tolerant of spreadsheet header spelling
    /// (`"Razão Social"` resolves like `razao_social`).
    fn resolve_header(header: &str) -> Option<(Self, usize)> {
        let key = header_key(header);
        if key.is_empty() {
            return None;
        }
        Self::ALL.into_iter().find_map(|field| {
            field.synonyms().iter().position(|s| header_key(s) == key).map(|rank| (field, rank))
        })
    }
}

impl std::fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn header_key(header: &str) -> String {
    fold(header.trim())
        .chars()
        .map(|c| if c.is_whitespace() || c == '-' { '_' } else { c })
        .collect()
}

/// Validated column mapping: each field maps to source columns ordered by synonym rank.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMapping {
    columns: BTreeMap<CanonicalField, Vec<(usize, String)>>,
}

impl ColumnMapping {
    /// Builds a mapping from caller-supplied `key → column` pairs.
    ///
    /// Keys must be canonical field names or one of their synonyms.
    pub fn from_pairs<'a, I>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut mapping = Self::default();
        for (key, column) in pairs {
            let (field, rank) =
                CanonicalField::resolve(key).ok_or_else(|| CoreError::UnknownField(key.to_owned()))?;
            if column.trim().is_empty() {
                continue;
            }
            mapping.insert(field, rank, column);
        }
        Ok(mapping)
    }

    /// Builds a mapping by matching row headers against field synonyms.
    pub fn detect<'a, I>(headers: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut mapping = Self::default();
        for header in headers {
            if let Some((field, rank)) = CanonicalField::resolve_header(header) {
                mapping.insert(field, rank, header);
            }
        }
        mapping
    }

    fn insert(&mut self, field: CanonicalField, rank: usize, column: &str) {
        let entry = self.columns.entry(field).or_default();
        if entry.iter().any(|(_, c)| c == column) {
            return;
        }
        let at = entry.partition_point(|(r, _)| *r <= rank);
        entry.insert(at, (rank, column.to_owned()));
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Source columns for `field`, most preferred first.
    pub fn columns_for(&self, field: CanonicalField) -> impl Iterator<Item = &str> {
        self.columns.get(&field).into_iter().flatten().map(|(_, c)| c.as_str())
    }

    /// First non-empty cell among the columns mapped to `field`.
    pub fn value(&self, row: &RawRow, field: CanonicalField) -> Option<String> {
        self.columns_for(field).find_map(|column| row.get(column).and_then(cell_text))
    }
}

/// Trimmed textual form of a cell, `None` when blank or not scalar.
pub fn cell_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_owned(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => return None,
    };
    (!text.is_empty()).then_some(text)
}

/// Whether any cell of the row carries data.
pub fn row_has_data(row: &RawRow) -> bool {
    row.values().any(|v| cell_text(v).is_some())
}

/// Batch-level provenance stamped onto every record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchMeta {
    pub source: String,
    pub source_batch_id: String,
    pub icp_id: String,
}

/// One external row after normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateRecord {
    /// Never empty
    pub company_name: String,
    /// Exactly 14 digits when present
    pub cnpj: Option<String>,
    /// `scheme://host`
    pub website: Option<String>,
    /// Lowercase host without `www.`, derived from `website`
    pub domain: Option<String>,
    pub sector: Option<String>,
    pub uf: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub contact_name: Option<String>,
    pub contact_role: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub linkedin_url: Option<String>,
    pub notes: Option<String>,
    pub source: String,
    pub source_batch_id: String,
    pub icp_id: String,
}

impl CandidateRecord {
    pub fn identity(&self) -> NormalizedIdentity {
        NormalizedIdentity { cnpj_digits: self.cnpj.clone(), domain: self.domain.clone() }
    }
}

/// The part of a record used for matching.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedIdentity {
    pub cnpj_digits: Option<String>,
    pub domain: Option<String>,
}

impl NormalizedIdentity {
    pub fn is_empty(&self) -> bool {
        self.cnpj_digits.is_none() && self.domain.is_none()
    }
}

/// Result of normalizing one row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedRow {
    pub record: CandidateRecord,
    /// Raw CNPJ that was present but not 14 digits, and was therefore dropped.
    pub discarded_cnpj: Option<String>,
}

/// Maps and normalizes one raw row into a [`CandidateRecord`].
pub fn normalize_row(row: &RawRow, mapping: &ColumnMapping, meta: &BatchMeta) -> NormalizedRow {
    let get = |field| mapping.value(row, field);

    let company_name = get(CanonicalField::CompanyName)
        .or_else(|| row.values().find_map(cell_text))
        .unwrap_or_else(|| FALLBACK_COMPANY_NAME.to_owned());

    let raw_cnpj = get(CanonicalField::Cnpj);
    let cnpj = normalize_cnpj(raw_cnpj.as_deref());
    let discarded_cnpj = if cnpj.is_none() { raw_cnpj } else { None };

    let website = normalize_website(get(CanonicalField::Website).as_deref());
    let domain = extract_domain(website.as_deref());

    let record = CandidateRecord {
        company_name,
        cnpj,
        website,
        domain,
        sector: normalize_text(get(CanonicalField::Sector).as_deref()),
        uf: normalize_uf(get(CanonicalField::Uf).as_deref()),
        city: get(CanonicalField::City),
        country: Some(get(CanonicalField::Country).unwrap_or_else(|| DEFAULT_COUNTRY.to_owned())),
        contact_name: get(CanonicalField::ContactName),
        contact_role: get(CanonicalField::ContactRole),
        contact_email: normalize_email(get(CanonicalField::ContactEmail).as_deref()),
        contact_phone: normalize_phone(get(CanonicalField::ContactPhone).as_deref()),
        linkedin_url: get(CanonicalField::LinkedinUrl),
        notes: get(CanonicalField::Notes),
        source: meta.source.clone(),
        source_batch_id: meta.source_batch_id.clone(),
        icp_id: meta.icp_id.clone(),
    };
    NormalizedRow { record, discarded_cnpj }
}

/// Kind of page a search result points to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BusinessType {
    Empresa,
    Vaga,
    Artigo,
    Perfil,
    Associacao,
    Educacional,
    Outro,
}

impl BusinessType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Empresa => "empresa",
            Self::Vaga => "vaga",
            Self::Artigo => "artigo",
            Self::Perfil => "perfil",
            Self::Associacao => "associacao",
            Self::Educacional => "educacional",
            Self::Outro => "outro",
        }
    }

    /// Job postings, articles and personal profiles never reach the final output.
    pub fn is_excluded(&self) -> bool {
        matches!(self, Self::Vaga | Self::Artigo | Self::Perfil)
    }

    /// Points subtracted from `relevancia`.
    pub fn penalty(&self) -> f64 {
        match self {
            Self::Vaga | Self::Artigo | Self::Perfil => 50.0,
            Self::Associacao | Self::Educacional => 30.0,
            Self::Empresa | Self::Outro => 0.0,
        }
    }
}

impl std::fmt::Display for BusinessType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for BusinessType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "empresa" => Ok(Self::Empresa),
            "vaga" => Ok(Self::Vaga),
            "artigo" => Ok(Self::Artigo),
            "perfil" => Ok(Self::Perfil),
            "associacao" => Ok(Self::Associacao),
            "educacional" => Ok(Self::Educacional),
            "outro" => Ok(Self::Outro),
            other => Err(CoreError::InvalidBusinessType(other.to_owned())),
        }
    }
}

/// Ideal customer profile the scorer compares candidates against.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetProfile {
    pub industry: String,
    #[serde(default)]
    pub products: Vec<String>,
}

/// A search result after classification and scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredCandidate {
    pub name: String,
    pub website: String,
    pub domain: String,
    pub description: String,
    /// Overall rank, 0..=100
    pub relevancia: u8,
    /// Semantic match against the target profile, 0..=100
    pub similarity_score: u8,
    pub business_type: BusinessType,
    pub source: String,
    /// 1-based position in the search engine results
    pub position: u32,
}
