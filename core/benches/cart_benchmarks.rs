use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::sync::Arc;
use tokio::runtime::Runtime; // To run the sync worker within Criterion
use toolcart::{compute_total, Cart, CartItem, CartStore, MemoryGateway, MemorySlot, SyncOrchestrator};
use uuid::Uuid;

// --- Helper: catalog of distinct products ---
fn catalog(lines: usize) -> Vec<CartItem> {
  (0..lines)
    .map(|i| {
      let item = CartItem::new(format!("sku-{}", i), format!("Tool {}", i), 10.0 + i as f64, 1 + (i % 5) as i32);
      if i % 3 == 0 {
        item.with_sale_price(9.0)
      } else {
        item
      }
    })
    .collect()
}

// --- Benchmark Functions ---

fn bench_compute_total(c: &mut Criterion) {
  let mut group = c.benchmark_group("compute_total");
  for lines in [1usize, 10, 100, 1000] {
    let items = catalog(lines);
    group.throughput(Throughput::Elements(lines as u64));
    group.bench_with_input(BenchmarkId::from_parameter(lines), &items, |b, items| {
      b.iter(|| compute_total(criterion::black_box(items)))
    });
  }
  group.finish();
}

fn bench_add_item_merge(c: &mut Criterion) {
  let mut group = c.benchmark_group("cart_add_item");
  for lines in [10usize, 100] {
    let items = catalog(lines);
    group.bench_with_input(BenchmarkId::new("existing_line", lines), &items, |b, items| {
      b.iter_batched(
        || Cart::from_items(items.clone()),
        |mut cart| {
          cart.add_item(CartItem::new(format!("sku-{}", lines - 1), "Tool", 1.0, 1));
          cart
        },
        criterion::BatchSize::SmallInput,
      )
    });
  }
  group.finish();
}

fn bench_store_mutation(c: &mut Criterion) {
  let store = CartStore::new(MemorySlot::new());
  store.replace_items(catalog(50));
  c.bench_function("store_update_quantity_persisted", |b| {
    let mut quantity = 1;
    b.iter(|| {
      quantity = quantity % 9 + 1;
      store.update_quantity("sku-25", quantity);
    })
  });
}

fn bench_mirrored_mutation(c: &mut Criterion) {
  let rt = Runtime::new().unwrap();
  let orchestrator = rt.block_on(async {
    let orchestrator = SyncOrchestrator::new(CartStore::new(MemorySlot::new()), Arc::new(MemoryGateway::new()));
    orchestrator.boot(Some(Uuid::new_v4())).await;
    orchestrator
  });
  c.bench_function("orchestrator_add_item_and_flush", |b| {
    b.to_async(&rt).iter(|| async {
      orchestrator.add_item(CartItem::new("sku-1", "Tool", 12.0, 1));
      orchestrator.flush().await;
    })
  });
}

criterion_group!(
  benches,
  bench_compute_total,
  bench_add_item_merge,
  bench_store_mutation,
  bench_mirrored_mutation
);
criterion_main!(benches);
