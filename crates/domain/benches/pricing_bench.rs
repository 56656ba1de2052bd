use common::{IngredientId, Money, ProductId, UserId, VariationId};
use criterion::{Criterion, criterion_group, criterion_main};
use domain::{
    CartItem, Product, RecipeLine, ResolvedLine, StockRequirements, StockTracking, Variation,
    pricing,
};

fn money(s: &str) -> Money {
    s.parse().unwrap()
}

fn make_line(quantity: u32) -> ResolvedLine {
    let product = Product {
        id: ProductId::new(),
        name: "Benchmark Pizza".to_string(),
        price: money("10.00"),
    };
    let variation = Variation {
        id: VariationId::new(),
        product_id: product.id,
        name: "large".to_string(),
        price_multiplier: "1.5".parse().unwrap(),
        tracking: StockTracking::Recipe(vec![
            RecipeLine {
                ingredient_id: IngredientId::new(),
                quantity: 200,
            },
            RecipeLine {
                ingredient_id: IngredientId::new(),
                quantity: 80,
            },
        ]),
    };
    ResolvedLine {
        cart_item: CartItem::new(UserId::new(), variation.id, quantity, vec![], Money::ZERO),
        product,
        variation,
        extras: vec![],
    }
}

fn bench_line_total(c: &mut Criterion) {
    let extras = [(money("2.00"), 1), (money("0.50"), 3)];

    c.bench_function("domain/line_total", |b| {
        b.iter(|| {
            pricing::line_total(money("10.00"), "1.5".parse().unwrap(), &extras, 2).unwrap()
        });
    });
}

fn bench_aggregate_requirements(c: &mut Criterion) {
    let lines: Vec<ResolvedLine> = (0..50u32).map(|i| make_line(i % 5 + 1)).collect();

    c.bench_function("domain/aggregate_requirements_50_lines", |b| {
        b.iter(|| StockRequirements::from_lines(lines.iter()));
    });
}

criterion_group!(benches, bench_line_total, bench_aggregate_requirements);
criterion_main!(benches);
