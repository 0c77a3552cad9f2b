use crate::model::{ProductRecord, StoreMetrics, SuggestionRecord};
use crate::schema::StoreId;

/// Below any real sales figure, so the first store scanned always becomes
/// the running candidate.
const NO_SALES: f64 = -1.0;

/// Transfer suggestions for one product, in store order.
///
/// Every store with zero sales and positive stock is an origin. Its
/// destination is the other store with the highest sales; ties go to the
/// store listed first. A destination that sold nothing is not a transfer
/// target, and the whole idle stock moves.
pub fn suggest_for_product(product: &ProductRecord) -> Vec<SuggestionRecord> {
    let mut suggestions = Vec::new();

    for (origin_idx, (origin, origin_metrics)) in product.metrics.iter().enumerate() {
        if !origin_metrics.is_idle() {
            continue;
        }

        let Some((destination, destination_sales)) = best_destination(&product.metrics, origin_idx)
        else {
            continue;
        };
        if destination_sales <= 0.0 {
            continue;
        }

        suggestions.push(SuggestionRecord {
            product_code: product.code.clone(),
            product_description: product.description.clone(),
            origin_store: origin.clone(),
            origin_sales: origin_metrics.sales,
            origin_stock: origin_metrics.stock,
            destination_store: destination.clone(),
            destination_sales,
            transfer_quantity: origin_metrics.stock,
        });
    }

    suggestions
}

/// Highest-selling store other than `exclude`. Strict `>` keeps the first
/// store seen on ties.
fn best_destination(
    metrics: &[(StoreId, StoreMetrics)],
    exclude: usize,
) -> Option<(&StoreId, f64)> {
    let mut best: Option<&StoreId> = None;
    let mut max_sales = NO_SALES;

    for (idx, (store, m)) in metrics.iter().enumerate() {
        if idx == exclude {
            continue;
        }
        if m.sales > max_sales {
            max_sales = m.sales;
            best = Some(store);
        }
    }

    best.map(|store| (store, max_sales))
}

/// Suggestions for a sequence of products, product order outer.
pub fn suggest_all<'a, I>(products: I) -> Vec<SuggestionRecord>
where
    I: IntoIterator<Item = &'a ProductRecord>,
{
    products.into_iter().flat_map(suggest_for_product).collect()
}
