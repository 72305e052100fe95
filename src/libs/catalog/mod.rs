pub mod tag_catalog;
