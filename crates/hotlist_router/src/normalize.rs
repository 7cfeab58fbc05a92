use crate::data::RouterData;
use crate::handler::HandlerOutput;

/// Wraps a handler's list into the response envelope.
///
/// Order is kept exactly as the handler produced it (the upstream's ranking);
/// nothing is sorted, filtered or deduplicated here.
pub fn normalize(output: HandlerOutput) -> RouterData {
    let HandlerOutput {
        meta,
        items,
        update_time,
        from_cache,
    } = output;

    RouterData {
        name: meta.name,
        title: meta.title,
        type_label: meta.type_label,
        description: meta.description,
        params: (!meta.params.is_empty()).then_some(meta.params),
        link: meta.link,
        total: items.len(),
        data: items,
        update_time,
        from_cache,
    }
}
