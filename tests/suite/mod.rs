mod bridge_loading;
mod numeric_field;
mod page_flow;
