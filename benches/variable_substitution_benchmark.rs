//! Benchmarks for template substitution.
//!
//! These benchmarks measure `untemplate` against in-memory environments and
//! recorded exchanges, so they time the engine rather than the filesystem.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use spag::document::Document;
use spag::environment::MemoryEnvironments;
use spag::history::MemoryExchanges;
use spag::variables::{describe_params, untemplate, VariableSources};
use std::collections::HashMap;

/// Generate an active `bench` environment with a specified number of top-level keys.
fn generate_environment(num_vars: usize) -> MemoryEnvironments {
    let mut yaml = String::from(
        "endpoint: https://api.example.com\nheaders:\n  authorization: Bearer token_12345\n",
    );
    for i in 0..num_vars {
        yaml.push_str(&format!("var_{}: value_{}\n", i, i));
    }

    let env = Document::from_yaml_str(&yaml).unwrap();
    let mut envs = MemoryEnvironments::new().with("bench", env);
    envs.set_active("bench");
    envs
}

/// Recorded exchanges holding a JSON body, as the remember store would.
fn generate_exchanges() -> MemoryExchanges {
    let last = Document::from_yaml_str(
        r#"
request:
  method: POST
  endpoint: https://api.example.com
  uri: /things
response:
  status: 201
  headers:
    location: /things/abc
  body: '{"id": "abc", "owner": {"name": "wumbo"}, "tags": ["a", "b"]}'
"#,
    )
    .unwrap();
    MemoryExchanges::new().with("last", last)
}

/// Generate a request template with a specified number of placeholders.
fn generate_template(num_refs: usize) -> String {
    let mut template = String::from("method: GET\nuri: /users/{{user_id}}\nheaders:\n");
    for i in 0..num_refs {
        template.push_str(&format!("  x-custom-{}: \"{{{{[].var_{}}}}}\"\n", i, i % 100));
    }
    template
}

fn withs() -> HashMap<String, String> {
    HashMap::from([("user_id".to_string(), "user_123".to_string())])
}

/// Benchmark a small template mixing all three candidate kinds.
fn bench_untemplate_simple(c: &mut Criterion) {
    let envs = generate_environment(10);
    let exchanges = generate_exchanges();
    let sources = VariableSources::new(&envs, &exchanges);
    let withs = withs();
    let template = "{{[].endpoint}}/users/{{user_id}}/things/{{last.response.body.id}}";

    c.bench_function("untemplate_simple", |b| {
        b.iter(|| untemplate(black_box(template), &withs, false, &sources))
    });
}

/// Benchmark placeholder count scaling.
fn bench_untemplate_many_refs(c: &mut Criterion) {
    let mut group = c.benchmark_group("untemplate_many_refs");
    let envs = generate_environment(100);
    let exchanges = generate_exchanges();
    let sources = VariableSources::new(&envs, &exchanges);
    let withs = withs();

    for num_refs in [10, 50, 100, 500].iter() {
        let template = generate_template(*num_refs);

        group.throughput(Throughput::Elements(*num_refs as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}_refs", num_refs)),
            num_refs,
            |b, _| b.iter(|| untemplate(black_box(&template), &withs, false, &sources)),
        );
    }

    group.finish();
}

/// Benchmark fallback lists where the early candidates miss.
fn bench_untemplate_fallbacks(c: &mut Criterion) {
    let envs = generate_environment(10);
    let exchanges = generate_exchanges();
    let sources = VariableSources::new(&envs, &exchanges);
    let withs = HashMap::new();
    let template = concat!(
        "{{missing, [].nope, other.response.body.id, last.response.body.owner.name}} ",
        "{{a, b : fallback}}"
    );

    c.bench_function("untemplate_fallbacks", |b| {
        b.iter(|| untemplate(black_box(template), &withs, false, &sources))
    });
}

/// Benchmark the shortcut pass, which decodes the body on every lookup.
fn bench_untemplate_shortcuts(c: &mut Criterion) {
    let envs = generate_environment(10);
    let exchanges = generate_exchanges();
    let sources = VariableSources::new(&envs, &exchanges);
    let withs = HashMap::new();
    let template = concat!(
        r#"{"id": "@id", "owner": "@owner.name", "#,
        r#""where": "@headers.location", "at": "@[].endpoint"}"#
    );

    c.bench_function("untemplate_shortcuts", |b| {
        b.iter(|| untemplate(black_box(template), &withs, true, &sources))
    });
}

/// Benchmark template-free text (the passthrough path).
fn bench_untemplate_no_placeholders(c: &mut Criterion) {
    let envs = generate_environment(10);
    let exchanges = generate_exchanges();
    let sources = VariableSources::new(&envs, &exchanges);
    let withs = HashMap::new();
    let text = "method: GET\nuri: /users/123\nheaders:\n  accept: application/json\n".repeat(20);

    let mut group = c.benchmark_group("untemplate_no_placeholders");
    group.throughput(Throughput::Bytes(text.len() as u64));
    group.bench_function("passthrough", |b| {
        b.iter(|| untemplate(black_box(&text), &withs, true, &sources))
    });
    group.finish();
}

/// Benchmark parameter description (parse only, no lookups).
fn bench_describe_params(c: &mut Criterion) {
    let mut group = c.benchmark_group("describe_params");

    for num_refs in [10, 100, 500].iter() {
        let template = generate_template(*num_refs);

        group.throughput(Throughput::Elements(*num_refs as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}_refs", num_refs)),
            num_refs,
            |b, _| b.iter(|| describe_params(black_box(&template), false)),
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_untemplate_simple,
    bench_untemplate_many_refs,
    bench_untemplate_fallbacks,
    bench_untemplate_shortcuts,
    bench_untemplate_no_placeholders,
    bench_describe_params
);

criterion_main!(benches);
