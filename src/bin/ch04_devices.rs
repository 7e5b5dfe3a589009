//! Chapter 4 - pick a GPU, create a logical device, open a window.

use vk_chapters::{run_chapter, Stage};

fn main() {
    run_chapter(Stage::Devices);
}
