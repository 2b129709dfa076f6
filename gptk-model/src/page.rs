/// One page of a paginated collection read.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Continuation token; `None` on the final page.
    #[cfg_attr(feature = "serde", serde(default))]
    pub next_page_id: Option<String>,
    /// Timestamp of the oldest item on a taken-date library page, used to ask
    /// for the next older page.
    #[cfg_attr(feature = "serde", serde(default))]
    pub last_item_timestamp: Option<i64>,
}
