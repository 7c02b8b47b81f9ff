//! Skill-name normalization and the curated related-technology table.
//!
//! Shared by the offline skill extractor and the hard-skills signal.

/// Technologies that are close enough that knowing one is partial evidence
/// for another.
pub const RELATED_CLUSTERS: &[&[&str]] = &[
    &["kafka", "rabbitmq", "pulsar", "kinesis", "nats", "activemq"],
    &["postgresql", "mysql", "mariadb", "oracle", "sql server", "sqlite", "sql"],
    &["mongodb", "cassandra", "dynamodb", "couchbase", "redis"],
    &["react", "vue", "angular", "svelte", "next.js"],
    &["javascript", "typescript", "node.js"],
    &["java", "kotlin", "scala"],
    &["c", "c++", "rust", "zig"],
    &["python", "pandas", "numpy", "django", "flask", "fastapi"],
    &["go", "rust"],
    &["c#", ".net", "asp.net"],
    &["docker", "kubernetes", "helm", "openshift", "podman"],
    &["aws", "gcp", "azure"],
    &["terraform", "ansible", "pulumi", "cloudformation"],
    &["spark", "hadoop", "flink", "airflow", "dbt"],
    &["machine learning", "pytorch", "tensorflow", "scikit-learn", "deep learning"],
    &["jenkins", "gitlab ci", "github actions", "circleci"],
    &["prometheus", "grafana", "elasticsearch", "kibana", "opentelemetry"],
    &["swift", "ios", "objective-c"],
    &["android", "kotlin"],
    &["graphql", "rest", "grpc"],
];

/// Extra vocabulary recognized by the offline extractor beyond the clusters.
pub const EXTRA_SKILLS: &[&str] = &[
    "linux", "git", "ruby", "rails", "php", "laravel", "spring", "hibernate", "figma",
    "product management", "project management", "scrum", "agile", "leadership",
    "system design", "microservices", "security", "networking", "data analysis",
    "excel", "tableau", "power bi", "bash", "html", "css", "webassembly", "unity",
];

/// Skill names that are also everyday words. Free text only counts them in
/// the qualified form on the right.
pub const QUALIFIED_SKILLS: &[(&str, &str)] = &[
    ("c", "c language"),
    ("go", "golang"),
    ("rest", "rest api"),
];

/// Lowercase, trim, and collapse internal whitespace.
pub fn normalize_skill(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Split text into lowercase word tokens, keeping `+`, `#` and `.` inside
/// words so names like `c++`, `c#` and `node.js` survive.
pub fn skill_tokens(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !(c.is_alphanumeric() || matches!(c, '+' | '#' | '.')))
        .map(|t| t.trim_matches('.'))
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Exact or token-level match: `"Apache Kafka"` matches `"kafka"`.
pub fn skills_match(candidate: &str, required: &str) -> bool {
    let a = normalize_skill(candidate);
    let b = normalize_skill(required);
    if a.is_empty() || b.is_empty() {
        return false;
    }
    if a == b {
        return true;
    }
    let a_tokens = skill_tokens(&a);
    let b_tokens = skill_tokens(&b);
    contains_sequence(&a_tokens, &b_tokens) || contains_sequence(&b_tokens, &a_tokens)
}

/// Related but not matching: same curated cluster, or one name contains the
/// other as a substring (`postgres` / `postgresql`).
pub fn skills_related(candidate: &str, required: &str) -> bool {
    let a = normalize_skill(candidate);
    let b = normalize_skill(required);
    if a.is_empty() || b.is_empty() || skills_match(&a, &b) {
        return false;
    }
    if a.len() >= 3 && b.len() >= 3 && (a.contains(&b) || b.contains(&a)) {
        return true;
    }
    RELATED_CLUSTERS
        .iter()
        .any(|cluster| cluster_contains(cluster, &a) && cluster_contains(cluster, &b))
}

fn cluster_contains(cluster: &[&str], skill: &str) -> bool {
    cluster.iter().any(|member| skills_match(member, skill))
}

/// `true` if `needle` occurs as a contiguous run inside `haystack`.
pub fn contains_sequence(haystack: &[String], needle: &[String]) -> bool {
    !needle.is_empty()
        && needle.len() <= haystack.len()
        && haystack.windows(needle.len()).any(|w| w == needle)
}
