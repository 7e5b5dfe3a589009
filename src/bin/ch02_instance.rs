//! Chapter 2 - create a Vulkan instance.

use vk_chapters::{run_chapter, Stage};

fn main() {
    run_chapter(Stage::Instance);
}
