use crate::{
    invoker::InvokeError,
    model::{NormalizedRecord, RecordBody, SearchItem, SearchPayload, UseCase},
};

/// Shape an invocation outcome into the record for `use_case`.
///
/// Pure: the same input always yields the same record, and every outcome,
/// failures included, maps to a record.
pub fn normalize(
    city: &str,
    search_query: &str,
    use_case: UseCase,
    outcome: &Result<SearchPayload, InvokeError>,
) -> NormalizedRecord {
    let body = match outcome {
        Err(err) => RecordBody::Failed { error: err.to_string() },
        Ok(payload) => RecordBody::Found {
            items: payload.results.iter().map(SearchItem::from).collect(),
            summary: payload.answer.clone(),
            raw_response: payload.raw_response.clone(),
        },
    };

    NormalizedRecord {
        city: city.to_string(),
        search_query: search_query.to_string(),
        use_case,
        body,
    }
}
