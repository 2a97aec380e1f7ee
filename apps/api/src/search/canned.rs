//! Fixed job listings served in local-testing mode.

use async_trait::async_trait;
use tracing::debug;

use crate::search::{rank, JobIndex, SearchError, SearchResult};

const SAMPLE_JOBS: [(f32, &str, &str, &str, &str, &str); 4] = [
    (
        0.95,
        "Software Engineer",
        "TechCorp",
        "$120,000/year",
        "UK",
        "Develop web applications using Python and JavaScript, focusing on scalable backend systems and user-friendly interfaces. Collaborate with cross-functional teams to deliver high-quality software solutions.",
    ),
    (
        0.90,
        "Backend Engineer",
        "CloudSys",
        "€95,000/year",
        "DE",
        "Design and implement scalable APIs using Node.js and Express, ensuring high performance and reliability for cloud-based applications.",
    ),
    (
        0.88,
        "Data Scientist",
        "Datacorp",
        "$130,000/year",
        "US",
        "Analyze large datasets to provide actionable insights, build machine learning models using Python and TensorFlow, and present findings to stakeholders.",
    ),
    (
        0.85,
        "Machine Learning Engineer",
        "InfraTech",
        "$140,000/year",
        "US",
        "Develop AI models with TensorFlow and PyTorch, optimize algorithms for real-time data processing, and deploy solutions on AWS.",
    ),
];

/// Ignores the query and namespace; always the same four listings.
pub struct CannedJobIndex;

#[async_trait]
impl JobIndex for CannedJobIndex {
    async fn search(
        &self,
        query: &str,
        namespace: &str,
        top_k: usize,
    ) -> Result<Vec<SearchResult>, SearchError> {
        debug!(
            "Local testing: canned results for '{query}' in '{namespace}' ({} chars)",
            query.len()
        );
        let results = SAMPLE_JOBS
            .iter()
            .map(
                |&(score, job_title, company_name, base_salary, country_code, job_summary)| {
                    SearchResult {
                        score,
                        job_title: job_title.to_string(),
                        company_name: company_name.to_string(),
                        base_salary: base_salary.to_string(),
                        country_code: country_code.to_string(),
                        job_summary: job_summary.to_string(),
                    }
                },
            )
            .collect();
        Ok(rank(results, top_k))
    }
}
