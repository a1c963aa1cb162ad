use chrono::{DateTime, SecondsFormat, TimeDelta, Utc};
use rand::Rng;
use serde::Serialize;

const PROJECTS: [&str; 5] = [
    "Custom Triton Kernel Optimization",
    "LLM Fine-tuning Pipeline",
    "RAG System Enhancement",
    "Computer Vision Model Training",
    "NLP Sentiment Analysis",
];

const MODELS: [&str; 5] = ["Llama 3.1 7B", "GPT-4o Mini", "Claude 3 Haiku", "BERT Large", "ResNet-50"];

const DATASETS: [&str; 5] = ["Custom Dataset", "OpenWebText", "Common Crawl", "ImageNet", "GLUE Benchmark"];

const MAX_RUNNING_MS: i64 = 4 * 60 * 60 * 1000;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrainingStatus {
    Training,
    Completed,
}

/// The "currently training" dashboard widget. Illustrative, not measured.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingStats {
    pub current_project: &'static str,
    pub progress: u32,
    pub eta: String,
    pub status: TrainingStatus,
    pub start_time: String,
    pub model: &'static str,
    pub dataset: &'static str,
}

fn pick<R: Rng + ?Sized>(rng: &mut R, items: &[&'static str]) -> &'static str {
    items[rng.gen_range(0..items.len())]
}

pub fn simulate_training<R: Rng + ?Sized>(rng: &mut R, now: DateTime<Utc>) -> TrainingStats {
    let status = if rng.gen_bool(0.8) { TrainingStatus::Training } else { TrainingStatus::Completed };
    let started = now - TimeDelta::milliseconds(rng.gen_range(0..MAX_RUNNING_MS));

    TrainingStats {
        current_project: pick(rng, &PROJECTS),
        progress: rng.gen_range(70..=99),
        eta: format!("{} minutes", rng.gen_range(15..=59)),
        status,
        start_time: started.to_rfc3339_opts(SecondsFormat::Millis, true),
        model: pick(rng, &MODELS),
        dataset: pick(rng, &DATASETS),
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 8, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_values_in_range() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut seen_completed = false;
        for _ in 0..500 {
            let stats = simulate_training(&mut rng, now());
            assert!((70..=99).contains(&stats.progress));
            assert!(PROJECTS.contains(&stats.current_project));
            assert!(MODELS.contains(&stats.model));
            assert!(DATASETS.contains(&stats.dataset));

            let minutes: u32 = stats.eta.strip_suffix(" minutes").unwrap().parse().unwrap();
            assert!((15..=59).contains(&minutes));

            let started = DateTime::parse_from_rfc3339(&stats.start_time).unwrap().with_timezone(&Utc);
            assert!(started <= now());
            assert!(now() - started < TimeDelta::hours(4));

            seen_completed |= stats.status == TrainingStatus::Completed;
        }
        assert!(seen_completed);
    }

    #[test]
    fn test_same_seed_same_stats() {
        let first = simulate_training(&mut StdRng::seed_from_u64(5), now());
        let second = simulate_training(&mut StdRng::seed_from_u64(5), now());
        assert_eq!(first, second);
    }

    #[test]
    fn test_json_names() {
        let json = serde_json::to_value(simulate_training(&mut StdRng::seed_from_u64(1), now())).unwrap();
        assert!(json.get("currentProject").is_some());
        assert!(json.get("startTime").is_some());
        assert!(json["status"] == "training" || json["status"] == "completed");
    }
}
