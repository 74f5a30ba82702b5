#![allow(
  clippy::expect_used,
  clippy::unwrap_used,
  reason = "Fine in benchmarks"
)]
use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use migjira_markup::{AttachmentMap, Converter, UserMapping, inline, tables};

const SHORT: &str = "h2. Summary\n*bold* and _italic_ with -struck- text, see \
                     [docs|https://example.com/a_b-c].";

const LONG: &str = r#"h1. Release checklist

{panel:title=Before you start|bgColor=#FFFAE6}
Make sure the *staging* environment is _green_.
{panel}

# Freeze the branch
## Tag the commit on 2025-01-14
## Notify [~accountid:abc123]
# Build artifacts
* Linux
** x86_64
** aarch64
* macOS

||Step||Owner||Status||
|Build|[~accountid:abc123]|{status:colour=Green}Done{status}|
|Sign|Release team|{status:colour=Yellow}In progress{status}|
|Publish|[Ops|https://ops.example.com/runbook_v2]|-cancelled-|

{code:rust}
fn main() {
    let value_with_underscores = 1 * 2 - 3;
    println!("{value_with_underscores}");
}
{code}

{quote}
Releases ship on ^Tuesdays^ only, H~2~O notwithstanding.
{quote}

!screenshot.png|width=400!
!notes.txt!
"#;

fn maps() -> (UserMapping, AttachmentMap) {
  let users = UserMapping::from([("abc123".to_owned(), "Release Bot".to_owned())]);
  let attachments = AttachmentMap::from([
    ("screenshot.png".to_owned(), "REL-1_screenshot.png".to_owned()),
    ("notes.txt".to_owned(), "REL-1_notes.txt".to_owned()),
  ]);
  (users, attachments)
}

fn bench_convert(c: &mut Criterion) {
  let mut group = c.benchmark_group("convert");
  let (users, attachments) = maps();
  let converter = Converter::new(&users, &attachments);
  let repeated = LONG.repeat(50);

  for (name, input) in [("short", SHORT), ("long", LONG), ("repeated", repeated.as_str())] {
    group.bench_with_input(BenchmarkId::new("full", name), &input, |b, text| {
      b.iter(|| converter.convert(black_box(text)));
    });
  }

  group.finish();
}

fn bench_passes(c: &mut Criterion) {
  let mut group = c.benchmark_group("passes");

  group.bench_with_input(
    BenchmarkId::new("decorations", "long"),
    &LONG,
    |b, text| {
      b.iter(|| inline::convert_decorations(black_box(text)));
    },
  );

  group.bench_with_input(BenchmarkId::new("tables", "long"), &LONG, |b, text| {
    b.iter(|| tables::convert_tables(black_box(text)));
  });

  group.finish();
}

criterion_group!(benches, bench_convert, bench_passes);
criterion_main!(benches);
