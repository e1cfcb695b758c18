use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use tablecore::{DataType, Table, Value};

fn setup_populated_table(n: usize, indexed: bool) -> Table {
    let mut table = Table::new();
    table.add_column(DataType::Int, "id").unwrap();
    table.add_column(DataType::Text, "name").unwrap();
    table.add_column(DataType::Int, "age").unwrap();
    table.add_column(DataType::Bool, "active").unwrap();

    for i in 0..n {
        let row = vec![
            Value::Int(i as i64),
            Value::from(format!("user{}", i)),
            Value::Int((i % 100) as i64),
            Value::Bool(i % 2 == 0),
        ];
        table.add(row).unwrap();
    }
    if indexed {
        table.add_search_index(1).unwrap();
        table.add_search_index(2).unwrap();
    }
    table
}

fn bench_add_rows(c: &mut Criterion) {
    let mut group = c.benchmark_group("Add_Row");
    for indexed in [false, true] {
        group.bench_function(BenchmarkId::new("add", indexed), |b| {
            let mut table = setup_populated_table(0, indexed);
            b.iter(|| {
                table
                    .add(black_box(vec![
                        Value::Int(42),
                        Value::from("name"),
                        Value::Int(7),
                        Value::Bool(true),
                    ]))
                    .unwrap();
            });
        });
    }
    group.finish();
}

fn bench_find_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("Find_All_Performance");

    for n in [1000, 10000].iter() {
        for indexed in [false, true] {
            let label = if indexed { "indexed" } else { "scan" };
            group.bench_with_input(BenchmarkId::new(label, n), n, |b, &n| {
                let table = setup_populated_table(n, indexed);
                b.iter(|| {
                    let rows = table.find_all_long(2, black_box(42)).unwrap();
                    black_box(rows);
                });
            });
        }
    }
    group.finish();
}

fn bench_find_first_string(c: &mut Criterion) {
    let mut group = c.benchmark_group("Find_First_String");

    for indexed in [false, true] {
        let label = if indexed { "indexed" } else { "scan" };
        group.bench_function(label, |b| {
            let table = setup_populated_table(10000, indexed);
            b.iter(|| {
                let row = table.find_first_string(1, black_box("user9999")).unwrap();
                black_box(row);
            });
        });
    }
    group.finish();
}

fn bench_remove_performance(c: &mut Criterion) {
    let mut group = c.benchmark_group("Remove_Performance");

    for n in [1000, 10000].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(n), n, |b, &n| {
            b.iter_with_setup(
                || setup_populated_table(n, true),
                |mut table| {
                    for _ in 0..10 {
                        table.remove(0).unwrap();
                    }
                    black_box(table);
                },
            );
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_add_rows,
    bench_find_scaling,
    bench_find_first_string,
    bench_remove_performance
);
criterion_main!(benches);
