//! HTTP client for the external object store holding case records.

use chrono::Utc;
use futures::future::join_all;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};
use webjuris_core::{
    CaseRecord, RawRecord, RelatedDecision, RelatedParty, Relations, normalize_at,
    normalize_with_relations,
};

use crate::config::{DEFAULT_PAGE_SIZE, ObjectStoreConfig};

const RELATED_PARTIES: &str = "relatedParties";
const RELATED_DECISIONS: &str = "relatedDecisions";

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned {status}: {body}")]
    Server { status: u16, body: String },
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Paging and server-side narrowing for a list request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListParams {
    /// 1-based page index.
    pub page: u32,
    pub page_size: u32,
    pub search: Option<String>,
    /// Raw filter expression, passed through untouched.
    pub filter: Option<String>,
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            search: None,
            filter: None,
        }
    }
}

impl ListParams {
    pub fn new(page: u32, page_size: u32) -> Self {
        Self {
            page: page.max(1),
            page_size: page_size.max(1),
            ..Default::default()
        }
    }

    /// Query pairs in the order the server documents them.
    pub fn pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("page", self.page.to_string()),
            ("pageSize", self.page_size.to_string()),
        ];
        if let Some(search) = self.search.as_deref().filter(|s| !s.trim().is_empty()) {
            pairs.push(("search", search.trim().to_string()));
        }
        if let Some(filter) = self.filter.as_deref().filter(|s| !s.trim().is_empty()) {
            pairs.push(("filter", filter.trim().to_string()));
        }
        pairs
    }
}

/// One page of a paginated collection.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_count: u64,
    pub page: u32,
    pub page_size: u32,
}

impl<T> Page<T> {
    pub fn has_more(&self) -> bool {
        u64::from(self.page) * u64::from(self.page_size) < self.total_count
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageBody {
    #[serde(default)]
    items: Vec<RawRecord>,
    total_count: Option<u64>,
}

/// Client for the case collection of the object store.
pub struct ObjectStoreClient {
    client: reqwest::Client,
    collection_url: String,
    username: String,
    password: SecretString,
    page_size: u32,
    fetch_related: bool,
}

impl ObjectStoreClient {
    pub fn new(config: ObjectStoreConfig) -> Result<Self, SyncError> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        let collection_url = config.collection_url();
        Ok(Self {
            client,
            collection_url,
            username: config.username,
            password: config.password,
            page_size: config.page_size,
            fetch_related: config.fetch_related,
        })
    }

    pub fn collection_url(&self) -> &str {
        &self.collection_url
    }

    /// Page size configured for this deployment.
    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    fn record_url(&self, id: &str) -> String {
        format!("{}/{}", self.collection_url, id.trim())
    }

    fn request(&self, method: reqwest::Method, url: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, url)
            .basic_auth(&self.username, Some(self.password.expose_secret()))
            .header(reqwest::header::ACCEPT, "application/json")
    }

    /// Check that the collection is reachable with the configured credentials.
    pub async fn ping(&self) -> Result<(), SyncError> {
        info!(url = %self.collection_url, "checking object store connection");
        let resp = self
            .request(reqwest::Method::GET, &self.collection_url)
            .query(&ListParams::new(1, 1).pairs())
            .send()
            .await?;
        ensure_success(resp).await?;
        Ok(())
    }

    /// Fetch one page of raw records.
    pub async fn list_raw(&self, params: &ListParams) -> Result<Page<RawRecord>, SyncError> {
        info!(
            url = %self.collection_url,
            page = params.page,
            page_size = params.page_size,
            search = params.search.as_deref().unwrap_or(""),
            "listing cases"
        );
        let resp = self
            .request(reqwest::Method::GET, &self.collection_url)
            .query(&params.pairs())
            .send()
            .await?;
        let text = ensure_success(resp).await?.text().await?;
        let body: PageBody = serde_json::from_str(&text)?;

        let total_count = body.total_count.unwrap_or(body.items.len() as u64);
        info!(count = body.items.len(), total = total_count, "listed cases");
        Ok(Page {
            items: body.items,
            total_count,
            page: params.page,
            page_size: params.page_size,
        })
    }

    pub async fn get_raw(&self, id: &str) -> Result<RawRecord, SyncError> {
        let url = self.record_url(id);
        info!(url = %url, "fetching case");
        let resp = self.request(reqwest::Method::GET, &url).send().await?;
        let text = ensure_success(resp).await?.text().await?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Create a case. The server assigns the identifier; the returned record
    /// is the normalised echo.
    pub async fn create(&self, record: &CaseRecord) -> Result<CaseRecord, SyncError> {
        info!(url = %self.collection_url, case_number = %record.case_number, "creating case");
        let resp = self
            .request(reqwest::Method::POST, &self.collection_url)
            .json(&outgoing_body(record)?)
            .send()
            .await?;
        let created = self.echoed(resp).await?;
        info!(id = %created.id, case_number = %created.case_number, "case created");
        Ok(created)
    }

    /// Partially update a case. Only the given fields are sent, so the
    /// server keeps whatever it holds for the rest.
    pub async fn update(&self, id: &str, changes: &RawRecord) -> Result<CaseRecord, SyncError> {
        let url = self.record_url(id);
        let fields: Vec<&str> = changes.keys().map(String::as_str).collect();
        info!(url = %url, fields = ?fields, "updating case");
        let resp = self
            .request(reqwest::Method::PATCH, &url)
            .json(changes)
            .send()
            .await?;
        self.echoed(resp).await
    }

    pub async fn delete(&self, id: &str) -> Result<(), SyncError> {
        let url = self.record_url(id);
        info!(url = %url, "deleting case");
        let resp = self.request(reqwest::Method::DELETE, &url).send().await?;
        ensure_success(resp).await?;
        Ok(())
    }

    async fn echoed(&self, resp: reqwest::Response) -> Result<CaseRecord, SyncError> {
        let text = ensure_success(resp).await?.text().await?;
        let raw: RawRecord = serde_json::from_str(&text)?;
        Ok(normalize_at(&raw, Utc::now()))
    }

    // ── Related data ──

    /// Parties attached to a case. Failures yield an empty list.
    pub async fn related_parties(&self, id: &str) -> Vec<RelatedParty> {
        self.related(id, RELATED_PARTIES)
            .await
            .iter()
            .filter_map(RelatedParty::from_raw)
            .collect()
    }

    /// Decisions attached to a case. Failures yield an empty list.
    pub async fn related_decisions(&self, id: &str) -> Vec<RelatedDecision> {
        self.related(id, RELATED_DECISIONS)
            .await
            .iter()
            .map(RelatedDecision::from_raw)
            .collect()
    }

    pub async fn relations(&self, id: &str) -> Relations {
        let (parties, decisions) =
            futures::join!(self.related_parties(id), self.related_decisions(id));
        Relations { parties, decisions }
    }

    async fn related(&self, id: &str, relation: &str) -> Vec<RawRecord> {
        match self.try_related(id, relation).await {
            Ok(items) => {
                debug!(id = %id, relation, count = items.len(), "related records");
                items
            }
            Err(e) => {
                warn!(id = %id, relation, error = %e, "related fetch failed, treating as empty");
                Vec::new()
            }
        }
    }

    async fn try_related(&self, id: &str, relation: &str) -> Result<Vec<RawRecord>, SyncError> {
        let url = format!("{}/{relation}", self.record_url(id));
        let resp = self.request(reqwest::Method::GET, &url).send().await?;
        let text = ensure_success(resp).await?.text().await?;
        Ok(related_items(serde_json::from_str(&text)?))
    }

    async fn relations_for(&self, raw: &RawRecord) -> Relations {
        match raw_id(raw) {
            Some(id) => self.relations(&id).await,
            None => Relations::default(),
        }
    }

    // ── Normalised views ──

    /// Fetch and normalise one page. When related data is enabled, the
    /// sub-fetches for every record on the page run as one batch.
    pub async fn load_page(&self, params: &ListParams) -> Result<Page<CaseRecord>, SyncError> {
        let raw = self.list_raw(params).await?;
        let relations = if self.fetch_related {
            join_all(raw.items.iter().map(|r| self.relations_for(r))).await
        } else {
            vec![Relations::default(); raw.items.len()]
        };

        let now = Utc::now();
        let items = raw
            .items
            .iter()
            .zip(&relations)
            .map(|(r, rel)| normalize_with_relations(r, rel, now))
            .collect();
        Ok(Page {
            items,
            total_count: raw.total_count,
            page: raw.page,
            page_size: raw.page_size,
        })
    }

    /// Walk every page and return all cases in server order.
    pub async fn load_all(&self, page_size: u32) -> Result<Vec<CaseRecord>, SyncError> {
        let mut params = ListParams::new(1, page_size);
        let mut all = Vec::new();
        loop {
            let page = self.load_page(&params).await?;
            let done = page.items.is_empty() || !page.has_more();
            all.extend(page.items);
            if done {
                break;
            }
            params.page += 1;
        }
        info!(count = all.len(), pages = params.page, "loaded all cases");
        Ok(all)
    }

    pub async fn fetch_case(&self, id: &str) -> Result<CaseRecord, SyncError> {
        let raw = self.get_raw(id).await?;
        let relations = if self.fetch_related {
            self.relations_for(&raw).await
        } else {
            Relations::default()
        };
        Ok(normalize_with_relations(&raw, &relations, Utc::now()))
    }
}

async fn ensure_success(resp: reqwest::Response) -> Result<reqwest::Response, SyncError> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(SyncError::Server {
            status: status.as_u16(),
            body,
        });
    }
    Ok(resp)
}

/// Key the object store uses to reject a second record with the same case
/// number.
pub fn external_reference_code(case_number: &str) -> String {
    format!("dossier-{}", case_number.trim().replace('/', "-"))
}

/// JSON sent on create. The server owns `id`.
fn outgoing_body(record: &CaseRecord) -> Result<Value, SyncError> {
    let mut body = serde_json::to_value(record)?;
    if let Value::Object(map) = &mut body {
        map.remove("id");
        map.insert(
            "externalReferenceCode".into(),
            Value::String(external_reference_code(&record.case_number)),
        );
    }
    Ok(body)
}

/// Related endpoints answer either `{"items": [...]}` or a bare array.
fn related_items(body: Value) -> Vec<RawRecord> {
    let items = match body {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("items") {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    };
    items
        .into_iter()
        .filter_map(|v| match v {
            Value::Object(map) => Some(map),
            _ => None,
        })
        .collect()
}

fn raw_id(raw: &RawRecord) -> Option<String> {
    match raw.get("id")? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use webjuris_core::{CaseStatus, Priority};

    fn record() -> CaseRecord {
        CaseRecord {
            id: "local-1".into(),
            title: "Divorce Martin".into(),
            client: "Marie Martin".into(),
            case_number: "2024/1504/1".into(),
            status: CaseStatus::Open,
            priority: Priority::High,
            description: "Procédure de divorce".into(),
            lawyer: "Me. Sophie Dubois".into(),
            court: None,
            court_of_appeal: Some("rabat".into()),
            first_instance_tribunal: None,
            next_hearing: None,
            last_decision: None,
            created_date: "2024-01-15T10:00:00.000Z".into(),
            last_update: "2024-01-15T10:00:00.000Z".into(),
        }
    }

    #[test]
    fn client_trims_trailing_slash() {
        let config = ObjectStoreConfig::new("http://localhost:8080/", "api", "secret");
        let client = ObjectStoreClient::new(config).unwrap();
        assert_eq!(client.collection_url(), "http://localhost:8080/o/c/dossiers");
        assert_eq!(client.record_url("42"), "http://localhost:8080/o/c/dossiers/42");
    }

    #[test]
    fn list_params_pairs() {
        let params = ListParams::new(2, 50);
        assert_eq!(
            params.pairs(),
            vec![("page", "2".to_string()), ("pageSize", "50".to_string())]
        );

        let params = ListParams {
            search: Some(" martin ".into()),
            filter: Some("statut eq 'open'".into()),
            ..ListParams::new(1, 20)
        };
        let keys: Vec<&str> = params.pairs().iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, ["page", "pageSize", "search", "filter"]);
        assert_eq!(params.pairs()[2].1, "martin");
    }

    #[test]
    fn blank_search_is_omitted() {
        let params = ListParams {
            search: Some("  ".into()),
            ..Default::default()
        };
        assert_eq!(params.pairs().len(), 2);
    }

    #[test]
    fn page_zero_is_clamped() {
        let params = ListParams::new(0, 0);
        assert_eq!((params.page, params.page_size), (1, 1));
    }

    #[test]
    fn has_more_follows_total() {
        let page = |page, total| Page::<()> {
            items: Vec::new(),
            total_count: total,
            page,
            page_size: 20,
        };
        assert!(page(1, 21).has_more());
        assert!(!page(1, 20).has_more());
        assert!(!page(2, 40).has_more());
        assert!(page(2, 41).has_more());
    }

    #[test]
    fn outgoing_body_drops_id_and_adds_reference_code() {
        let body = outgoing_body(&record()).unwrap();
        assert!(body.get("id").is_none());
        assert_eq!(body["externalReferenceCode"], "dossier-2024-1504-1");
        assert_eq!(body["caseNumber"], "2024/1504/1");
        assert_eq!(body["courtOfAppeal"], "rabat");
        assert!(body.get("nextHearing").is_none());
    }

    #[test]
    fn related_items_accepts_both_shapes() {
        let wrapped = json!({"items": [{"name": "A"}, {"name": "B"}], "totalCount": 2});
        assert_eq!(related_items(wrapped).len(), 2);

        let bare = json!([{"name": "A"}, 3, "x"]);
        assert_eq!(related_items(bare).len(), 1);

        assert!(related_items(json!({"error": "nope"})).is_empty());
        assert!(related_items(Value::Null).is_empty());
    }

    #[test]
    fn raw_id_accepts_numbers_and_strings() {
        let raw = |v: Value| json!({ "id": v }).as_object().cloned().unwrap();
        assert_eq!(raw_id(&raw(json!(40021))), Some("40021".into()));
        assert_eq!(raw_id(&raw(json!(" abc "))), Some("abc".into()));
        assert_eq!(raw_id(&raw(json!(""))), None);
        assert_eq!(raw_id(&raw(Value::Null)), None);
    }
}
