//! Chapter 8 - create a swapchain for the window surface.

use vk_chapters::{run_chapter, Stage};

fn main() {
    run_chapter(Stage::Swapchain);
}
