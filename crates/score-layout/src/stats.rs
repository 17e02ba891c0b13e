use crate::layout::LayoutPlan;

/// Summary of a planned layout
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutStatistics {
    pub items: usize,
    pub pages: usize,
    pub columns: usize,
    pub column_width_mm: f32,
    /// Number of items on each page
    pub items_per_page: Vec<usize>,
    /// Height of the tallest page (the only page when unbounded)
    pub max_page_height_mm: f32,
}

/// Calculate statistics for a layout plan
pub fn calculate_statistics(plan: &LayoutPlan) -> LayoutStatistics {
    let items_per_page: Vec<usize> = plan.pages.iter().map(|page| page.items.len()).collect();

    LayoutStatistics {
        items: items_per_page.iter().sum(),
        pages: plan.page_count(),
        columns: plan.columns,
        column_width_mm: plan.column_width_mm,
        items_per_page,
        max_page_height_mm: plan.pages.iter().map(|p| p.height_mm).fold(0.0, f32::max),
    }
}
