// Integration tests for the statistical summarizer with the real tokenizer
use mailprep::config::SummarizerConfig;
use mailprep::summarizer::{SelectionStrategy, SentenceSplitter, StatisticalSummarizer};
use mailprep::tokenizer::{TiktokenCounter, TokenCounter};
use std::sync::Arc;

const THREAD: &str = "Hi, I ordered a stand mixer on March 3rd and the package arrived damaged. \
The bowl is cracked and the mixer makes a grinding noise. \
I would like a replacement mixer or a full refund. \
Our records show the mixer shipped from the Busan warehouse. \
We have opened a return request for the damaged mixer. \
Please send photos of the damaged bowl and the box. \
Once we receive the photos we will ship a replacement mixer within two days. \
Thank you for your patience while we sort this out!";

fn counter() -> Arc<TiktokenCounter> {
    Arc::new(TiktokenCounter::for_model("gpt-4o").unwrap())
}

fn summarizer() -> StatisticalSummarizer {
    StatisticalSummarizer::from_config(&SummarizerConfig::default(), counter()).unwrap()
}

#[test]
fn test_budget_never_exceeded() {
    let counter = counter();
    let summarizer = summarizer();

    for budget in [1, 5, 10, 20, 40, 80, 160] {
        let summary = summarizer.summarize(THREAD, budget);
        assert!(
            counter.count_tokens(&summary) <= budget,
            "budget {} exceeded: {:?}",
            budget,
            summary
        );
    }
}

#[test]
fn test_skip_overflow_respects_budget() {
    let counter = counter();
    let summarizer = summarizer().with_selection(SelectionStrategy::SkipOverflow);

    for budget in [10, 25, 50] {
        let summary = summarizer.summarize(THREAD, budget);
        assert!(counter.count_tokens(&summary) <= budget);
    }
}

#[test]
fn test_ample_budget_keeps_every_sentence() {
    let counter = counter();
    let summarizer = summarizer();
    let budget = counter.count_tokens(THREAD) + 10;

    let summary = summarizer.summarize_detailed(THREAD, budget);

    assert_eq!(summary.sentence_count, 8);
    assert_eq!(summary.selected, (0..8).collect::<Vec<_>>());
    assert_eq!(summary.text, THREAD);
    assert!(!summary.truncated);
}

#[test]
fn test_selection_favours_salient_sentences() {
    let summarizer = summarizer();
    let summary = summarizer.summarize_detailed(THREAD, 30);

    // "mixer" and "damaged" dominate the thread; the sign-off shares neither
    assert!(!summary.selected.is_empty());
    assert!(!summary.selected.contains(&7));
    assert!(summary.text.contains("mixer"));
}

#[test]
fn test_output_keeps_reading_order() {
    let summarizer = summarizer();
    let summary = summarizer.summarize_detailed(THREAD, 60);

    let mut sorted = summary.selected.clone();
    sorted.sort_unstable();
    assert_eq!(summary.selected, sorted);

    if summary.truncated {
        return;
    }

    let sentences = SentenceSplitter::new().unwrap().split(THREAD);
    let expected = summary
        .selected
        .iter()
        .map(|&i| sentences[i].as_str())
        .collect::<Vec<_>>()
        .join(" ");
    assert_eq!(summary.text, expected);
}

#[test]
fn test_no_sentences() {
    let summarizer = summarizer();
    assert_eq!(summarizer.summarize("", 100), "");
    assert_eq!(summarizer.summarize("\n \t", 100), "");
}
