//! Performance benchmarks for registry lookup and host calls.
//!
//! - Lookup: resolving names across a growing number of implementations
//! - Host calls: resolving and invoking a registered host function
//! - Creation: the first-use path of `get_or_create`

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use polyload::prelude::*;
use polyload::{AdapterError, LoadError};
use std::hint::black_box;
use std::path::{Path, PathBuf};

/// Adapter that defines `count` values named `<tag>_<n>` on creation.
struct Populated {
    context: Context,
}

impl Adapter for Populated {
    fn capabilities(&self) -> Capabilities {
        Capabilities::empty()
    }

    fn execution_path(&mut self, _path: &Path) -> Result<(), AdapterError> {
        Ok(())
    }

    fn load_from_file(&mut self, _paths: &[PathBuf]) -> Result<(), LoadError> {
        Ok(())
    }

    fn load_from_memory(&mut self, _buffer: &[u8]) -> Result<(), LoadError> {
        Ok(())
    }

    fn load_from_package(&mut self, _path: &Path) -> Result<(), LoadError> {
        Ok(())
    }

    fn context(&self) -> &Context {
        &self.context
    }
}

fn populated_factory(count: usize) -> impl AdapterFactory + 'static {
    move |tag: &Tag, _: &Path| -> Result<Box<dyn Adapter>, AdapterError> {
        let context = Context::new(tag.as_str());
        for n in 0..count {
            context.define(format!("{tag}_{n}"), Value::Long(n as i64));
        }
        Ok(Box::new(Populated { context }))
    }
}

/// Ready registry with `adapters` live implementations of 100 symbols each.
fn registry_with(adapters: usize) -> Registry {
    let mut builder =
        Registry::builder().config(LoaderConfig::default().without_script_path());
    for i in 0..adapters {
        let tag = Tag::new(format!("lang{i}")).expect("valid tag");
        builder = builder.factory(tag, populated_factory(100));
    }
    let registry = builder.build().expect("no reserved tags");
    registry.initialize();
    for i in 0..adapters {
        registry
            .get_or_create(&format!("lang{i}"))
            .expect("factory registered");
    }
    registry
}

/// Benchmark name resolution as the number of implementations grows
fn lookup_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("registry/lookup");

    for adapters in [1usize, 4, 16] {
        let registry = registry_with(adapters);
        let last = format!("lang{}_99", adapters - 1);

        // Hit in the first implementation after the host proxy
        group.bench_with_input(BenchmarkId::new("first_hit", adapters), &adapters, |b, _| {
            b.iter(|| black_box(registry.get(black_box("lang0_0"))));
        });

        // Hit in the last implementation: walks the whole map
        group.bench_with_input(BenchmarkId::new("last_hit", adapters), &adapters, |b, _| {
            b.iter(|| black_box(registry.get(black_box(&last))));
        });

        group.bench_with_input(BenchmarkId::new("miss", adapters), &adapters, |b, _| {
            b.iter(|| black_box(registry.get(black_box("missing"))));
        });
    }

    group.finish();
}

/// Benchmark resolving and invoking a host function
fn host_call_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("registry/host_call");

    let registry = registry_with(4);
    registry
        .register(
            "add",
            |args: &[Value]| {
                let a = i64::from_value(&args[0])?;
                let b = i64::from_value(&args[1])?;
                Ok(Value::Long(a + b))
            },
            TypeId::Long,
            &[TypeId::Long, TypeId::Long],
        )
        .expect("register add");
    let args = [Value::Long(2), Value::Long(3)];

    group.bench_function("resolve_and_invoke", |b| {
        b.iter(|| {
            let object = registry.get(black_box("add")).expect("add defined");
            let function = object.as_function().expect("add is a function");
            black_box(function.invoke(black_box(&args)))
        });
    });

    let object = registry.get("add").expect("add defined");
    group.bench_function("invoke_only", |b| {
        let function = object.as_function().expect("add is a function");
        b.iter(|| black_box(function.invoke(black_box(&args))));
    });

    group.finish();
}

/// Benchmark the first-use creation path
fn creation_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("registry/creation");

    group.bench_function("get_or_create_cold", |b| {
        b.iter(|| {
            let registry = registry_with(0);
            registry
                .add_factory(Tag::new("cold").expect("valid tag"), populated_factory(100))
                .expect("not reserved");
            black_box(registry.get_or_create("cold").expect("created"))
        });
    });

    let registry = registry_with(1);
    group.bench_function("get_or_create_warm", |b| {
        b.iter(|| black_box(registry.get_or_create(black_box("lang0")).expect("live")));
    });

    group.finish();
}

criterion_group!(
    benches,
    lookup_benchmarks,
    host_call_benchmarks,
    creation_benchmarks
);
criterion_main!(benches);
