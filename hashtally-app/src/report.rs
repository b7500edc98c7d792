use hashtally_core::AggregationResult;
use std::fmt::Write;
use time::format_description::well_known::Rfc3339;

pub fn render_json(result: &AggregationResult) -> serde_json::Result<String> {
    serde_json::to_string_pretty(result)
}

/// Plain-text summary followed by tags ranked by count.
pub fn render_text(result: &AggregationResult) -> String {
    let oldest = result
        .oldest_post_read
        .map(|t| t.format(&Rfc3339).unwrap_or_else(|_| t.to_string()))
        .unwrap_or_else(|| "-".to_string());

    let mut out = String::new();
    let _ = writeln!(out, "@{}", result.handle);
    let _ = writeln!(out, "followers:        {}", result.followers_count);
    let _ = writeln!(out, "posts (total):    {}", result.total_posts_count);
    let _ = writeln!(out, "run date:         {}", result.run_date);
    let _ = writeln!(out, "posts read:       {}", result.posts_read);
    let _ = writeln!(out, "oldest post read: {oldest}");

    let counts = &result.hashtag_counts;
    if counts.is_empty() {
        let _ = writeln!(out, "no hashtags found");
        return out;
    }

    let _ = writeln!(
        out,
        "hashtags ({} distinct, {} mentions):",
        counts.len(),
        counts.total()
    );
    let ranked = counts.ranked();
    let width = ranked
        .iter()
        .map(|(tag, _)| tag.chars().count())
        .max()
        .unwrap_or(0);
    for (tag, count) in ranked {
        let pad = width - tag.chars().count();
        let _ = writeln!(out, "  #{tag}{:pad$}  {count}", "");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use hashtally_core::HashtagCounts;
    use time::macros::{date, datetime};

    fn result(counts: HashtagCounts) -> AggregationResult {
        AggregationResult {
            handle: "ferris".into(),
            followers_count: 1234,
            total_posts_count: 3,
            run_date: date!(2026 - 10 - 18),
            posts_read: 3,
            oldest_post_read: Some(datetime!(2024-01-15 08:30 UTC)),
            hashtag_counts: counts,
        }
    }

    #[test]
    fn text_report_ranks_tags() {
        let counts: HashtagCounts = [("Rust", 1), ("rust", 1), ("Go", 2)].into_iter().collect();
        let text = render_text(&result(counts));
        let expected = "\
@ferris
followers:        1234
posts (total):    3
run date:         2026-10-18
posts read:       3
oldest post read: 2024-01-15T08:30:00Z
hashtags (3 distinct, 4 mentions):
  #Go    2
  #Rust  1
  #rust  1
";
        assert_eq!(text, expected);
    }

    #[test]
    fn text_report_without_tags() {
        let mut r = result(HashtagCounts::new());
        r.posts_read = 0;
        r.oldest_post_read = None;
        let text = render_text(&r);
        assert!(text.contains("oldest post read: -\n"));
        assert!(text.ends_with("no hashtags found\n"));
    }

    #[test]
    fn json_report_is_structured() {
        let counts: HashtagCounts = [("Go", 2)].into_iter().collect();
        let json: serde_json::Value =
            serde_json::from_str(&render_json(&result(counts)).unwrap()).unwrap();
        assert_eq!(json["handle"], "ferris");
        assert_eq!(json["run_date"], "2026-10-18");
        assert_eq!(json["oldest_post_read"], "2024-01-15T08:30:00Z");
        assert_eq!(json["hashtag_counts"]["Go"], 2);
    }
}
