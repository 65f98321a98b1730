pub mod plot_search;
pub mod providers;
pub mod recommendations;
pub mod social;
