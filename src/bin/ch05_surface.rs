//! Chapter 5 - create a presentation surface and choose its color format.

use vk_chapters::{run_chapter, Stage};

fn main() {
    run_chapter(Stage::Surface);
}
