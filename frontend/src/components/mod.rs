pub mod add_feed_form;
pub mod d3_checklist;
pub mod history;
pub mod record_list;
