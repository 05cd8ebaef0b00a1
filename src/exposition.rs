//! Deterministic rendering of the Prometheus text exposition format.
//!
//! The exporter renders families in storage order, which is not stable across
//! calls. [`canonicalize`] regroups the raw output by family, sorts families by
//! name and samples by label set, and adds header-only entries for declared
//! families that have not been observed yet.

/// A metric family that is exposed even before its first sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FamilyHeader {
    /// Metric name without sample suffixes.
    pub name: &'static str,
    /// Prometheus type: `counter`, `gauge`, `histogram` or `summary`.
    pub kind: &'static str,
    /// Help text.
    pub help: &'static str,
}

#[derive(Debug)]
struct Family {
    name: String,
    comments: Vec<String>,
    samples: Vec<String>,
}

impl Family {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            comments: Vec::new(),
            samples: Vec::new(),
        }
    }

    fn from_header(header: &FamilyHeader) -> Self {
        Self {
            name: header.name.to_string(),
            comments: vec![
                format!("# HELP {} {}", header.name, header.help),
                format!("# TYPE {} {}", header.name, header.kind),
            ],
            samples: Vec::new(),
        }
    }
}

/// Histogram and summary series share their family's name as a prefix.
const SAMPLE_SUFFIXES: &[&str] = &["_bucket", "_sum", "_count"];

/// Rewrite raw exposition text into a stable, sorted form.
///
/// Families are ordered by name. Within a family, `# HELP` precedes `# TYPE`
/// and samples are ordered by their label set with `le` ignored, so histogram
/// buckets keep the exporter's ascending order. Integer sample values are
/// written as floats (`3` becomes `3.0`).
pub fn canonicalize(raw: &str, declared: &[FamilyHeader]) -> String {
    let mut families: Vec<Family> = Vec::new();

    for line in raw.lines().map(str::trim_end).filter(|l| !l.is_empty()) {
        if let Some(name) = comment_family(line) {
            if !families.last().is_some_and(|f| f.name == name) {
                families.push(Family::new(name));
            }
            if let Some(family) = families.last_mut() {
                family.comments.push(line.to_string());
            }
        } else if line.starts_with('#') {
            continue;
        } else {
            let name = sample_name(line);
            if !families.last().is_some_and(|f| belongs_to(&f.name, name)) {
                families.push(Family::new(name));
            }
            if let Some(family) = families.last_mut() {
                family.samples.push(float_value(line));
            }
        }
    }

    for header in declared {
        if !families.iter().any(|f| f.name == header.name) {
            families.push(Family::from_header(header));
        }
    }

    families.sort_by(|a, b| a.name.cmp(&b.name));

    let mut output = String::new();
    for (index, family) in families.iter_mut().enumerate() {
        if index > 0 {
            output.push('\n');
        }
        family
            .comments
            .sort_by_key(|c| if c.starts_with("# HELP") { 0 } else { 1 });
        family.samples.sort_by_cached_key(|s| series_key(s));

        for line in family.comments.iter().chain(family.samples.iter()) {
            output.push_str(line);
            output.push('\n');
        }
    }
    output
}

/// Find the value of the sample whose name and label set are exactly `series`,
/// e.g. `app_requests_total{endpoint="/api/health",method="GET"}`.
pub fn sample_value(exposition: &str, series: &str) -> Option<f64> {
    exposition
        .lines()
        .filter(|line| !line.starts_with('#'))
        .find_map(|line| line.strip_prefix(series)?.strip_prefix(' '))
        .and_then(|value| value.trim().parse().ok())
}

/// Write an integer sample value in float form, leaving other values as-is.
fn float_value(line: &str) -> String {
    let Some((series, value)) = line.rsplit_once(' ') else {
        return line.to_string();
    };
    let digits = value.strip_prefix('-').unwrap_or(value);
    if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
        format!("{series} {value}.0")
    } else {
        line.to_string()
    }
}

fn comment_family(line: &str) -> Option<&str> {
    let rest = line
        .strip_prefix("# HELP ")
        .or_else(|| line.strip_prefix("# TYPE "))?;
    rest.split_whitespace().next()
}

fn sample_name(line: &str) -> &str {
    let end = line.find(|c: char| c == '{' || c == ' ').unwrap_or(line.len());
    &line[..end]
}

fn belongs_to(family: &str, sample: &str) -> bool {
    match sample.strip_prefix(family) {
        Some("") => true,
        Some(suffix) => SAMPLE_SUFFIXES.contains(&suffix),
        None => false,
    }
}

/// Label set of a sample with the `le` bucket bound removed.
fn series_key(sample: &str) -> String {
    let (Some(open), Some(close)) = (sample.find('{'), sample.rfind('}')) else {
        return String::new();
    };
    if close <= open {
        return String::new();
    }

    split_labels(&sample[open + 1..close])
        .into_iter()
        .filter(|label| !label.starts_with("le="))
        .collect::<Vec<_>>()
        .join(",")
}

/// Split `k="v",k2="v2"` on commas that are not inside a quoted value.
fn split_labels(body: &str) -> Vec<&str> {
    let mut labels = Vec::new();
    let mut start = 0;
    let mut in_quotes = false;
    let mut escaped = false;

    for (i, c) in body.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' if in_quotes => escaped = true,
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                labels.push(&body[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    if start < body.len() {
        labels.push(&body[start..]);
    }
    labels
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const REQUESTS: FamilyHeader = FamilyHeader {
        name: "app_requests_total",
        kind: "counter",
        help: "Total HTTP requests",
    };

    #[test]
    fn families_are_sorted_by_name() {
        let raw = "# TYPE zeta counter\nzeta 1\n\n# TYPE alpha counter\nalpha 2\n";
        assert_eq!(
            canonicalize(raw, &[]),
            "# TYPE alpha counter\nalpha 2.0\n\n# TYPE zeta counter\nzeta 1.0\n"
        );
    }

    #[test]
    fn samples_sorted_by_labels_keep_bucket_order() {
        let raw = concat!(
            "# TYPE lat histogram\n",
            "lat_bucket{endpoint=\"/b\",le=\"0.1\"} 1\n",
            "lat_bucket{endpoint=\"/b\",le=\"+Inf\"} 1\n",
            "lat_sum{endpoint=\"/b\"} 0.05\n",
            "lat_count{endpoint=\"/b\"} 1\n",
            "lat_bucket{endpoint=\"/a\",le=\"0.1\"} 0\n",
            "lat_bucket{endpoint=\"/a\",le=\"+Inf\"} 2\n",
            "lat_sum{endpoint=\"/a\"} 0.4\n",
            "lat_count{endpoint=\"/a\"} 2\n",
        );

        let expected = concat!(
            "# TYPE lat histogram\n",
            "lat_bucket{endpoint=\"/a\",le=\"0.1\"} 0.0\n",
            "lat_bucket{endpoint=\"/a\",le=\"+Inf\"} 2.0\n",
            "lat_sum{endpoint=\"/a\"} 0.4\n",
            "lat_count{endpoint=\"/a\"} 2.0\n",
            "lat_bucket{endpoint=\"/b\",le=\"0.1\"} 1.0\n",
            "lat_bucket{endpoint=\"/b\",le=\"+Inf\"} 1.0\n",
            "lat_sum{endpoint=\"/b\"} 0.05\n",
            "lat_count{endpoint=\"/b\"} 1.0\n",
        );
        assert_eq!(canonicalize(raw, &[]), expected);
    }

    #[test]
    fn declared_family_without_samples_gets_header() {
        let rendered = canonicalize("", &[REQUESTS]);
        assert_eq!(
            rendered,
            "# HELP app_requests_total Total HTTP requests\n# TYPE app_requests_total counter\n"
        );
    }

    #[test]
    fn declared_family_already_present_is_not_duplicated() {
        let raw = "# HELP app_requests_total Total HTTP requests\n# TYPE app_requests_total counter\napp_requests_total{method=\"GET\"} 4\n";
        let rendered = canonicalize(raw, &[REQUESTS]);
        assert_eq!(rendered.matches("# TYPE app_requests_total").count(), 1);
        assert!(rendered.ends_with("app_requests_total{method=\"GET\"} 4.0\n"));
    }

    #[test]
    fn integer_values_are_written_as_floats() {
        assert_eq!(float_value(r#"c{method="GET"} 1"#), r#"c{method="GET"} 1.0"#);
        assert_eq!(float_value("c 42"), "c 42.0");
        assert_eq!(float_value("g -3"), "g -3.0");
        assert_eq!(float_value("s 0.25"), "s 0.25");
        assert_eq!(float_value("s 1e-7"), "s 1e-7");
        assert_eq!(float_value(r#"b{le="+Inf"} NaN"#), r#"b{le="+Inf"} NaN"#);
    }

    #[test]
    fn split_labels_ignores_commas_inside_values() {
        let labels = split_labels(r#"a="x,y",b="say \"hi\", ok",c="z""#);
        assert_eq!(labels, vec![r#"a="x,y""#, r#"b="say \"hi\", ok""#, r#"c="z""#]);
    }

    #[test]
    fn sample_value_matches_exact_series() {
        let body = "# TYPE c counter\nc{endpoint=\"/api/health\",method=\"GET\"} 3\nc{endpoint=\"/api/health/x\",method=\"GET\"} 9\n";
        assert_eq!(
            sample_value(body, r#"c{endpoint="/api/health",method="GET"}"#),
            Some(3.0)
        );
        assert_eq!(sample_value(body, r#"c{endpoint="/nope",method="GET"}"#), None);
    }
}
