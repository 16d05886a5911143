//! Issue discovery: paginated search for issues diverging from the target.

use jd_core::{CandidateIssue, IssueQuery, ReconcileEvent};
use jd_jira::JiraApi;

use crate::sink::EventSink;

/// Every issue in the query's project whose field is unset or differs from
/// the target value, in provider order.
///
/// Pages are requested from offset 0 in steps of `page_size`; a page shorter
/// than `page_size` is the last one. A failed page stops pagination and the
/// issues gathered so far are returned, with a `DiscoveryTruncated` event as
/// the only trace of the gap.
pub async fn find_candidates<A: JiraApi + ?Sized>(
    api: &A,
    sink: &dyn EventSink,
    query: &IssueQuery,
    page_size: usize,
) -> Vec<CandidateIssue> {
    let page_size = page_size.max(1);
    let mut candidates = Vec::new();
    let mut start_at = 0;

    loop {
        let page = match api.search(query, start_at, page_size).await {
            Ok(page) => page,
            Err(error) => {
                sink.emit(&ReconcileEvent::DiscoveryTruncated {
                    project_key: query.project_key.clone(),
                    start_at,
                    fetched: candidates.len(),
                    reason: error.to_string(),
                });
                break;
            }
        };

        let last_page = page.len() < page_size;
        // The provider's predicate is trusted for paging, not for membership.
        candidates.extend(
            page.into_iter()
                .filter(|issue| issue.diverges_from(&query.target_value)),
        );
        if last_page {
            break;
        }
        start_at += page_size;
    }

    candidates
}
