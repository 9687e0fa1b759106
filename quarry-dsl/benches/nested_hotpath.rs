use criterion::{criterion_group, criterion_main, Criterion};
use quarry_dsl::{parse_nested_flat, parse_nested_tree, pretty_print_nested};
use std::hint::black_box;

const NESTED_FLAT: &str = "author{profile,avatar},posts{comments{author{profile}},tags},reviewers";

const NESTED_TREE: &str = r#"author{ {"select":["id","name"]}, profile },
posts{ {"where":{"$or":[{"status":"published"},{"views":{"$gte":100}}]},"sort":[{"field":"created_at","dir":"desc"}],"limit":10},
  comments{ {"where":{"body":{"$ilike":"great"}}}, author },
  tags
}"#;

fn bench_flat(c: &mut Criterion) {
    c.bench_function("nested/flat", |b| {
        b.iter(|| {
            let paths = parse_nested_flat(black_box(NESTED_FLAT));
            black_box(paths.len());
        });
    });
}

fn bench_tree(c: &mut Criterion) {
    c.bench_function("nested/tree", |b| {
        b.iter(|| {
            let tree = parse_nested_tree(black_box(NESTED_TREE));
            black_box(tree.len());
        });
    });

    let tree = parse_nested_tree(NESTED_TREE);
    c.bench_function("nested/pretty_print", |b| {
        b.iter(|| black_box(pretty_print_nested(black_box(&tree))));
    });
}

criterion_group!(benches, bench_flat, bench_tree);
criterion_main!(benches);
