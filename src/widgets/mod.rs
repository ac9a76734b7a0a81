pub mod chart;
pub mod chart_export_modal;
pub mod controls;
pub mod debug;
pub mod distribution_list;
pub mod form;
pub mod radio_block;
pub mod text_input;
pub mod text_input_common;
