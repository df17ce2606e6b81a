//! Interactive walkthrough of the explicit free-list allocator, driven by
//! `sbrk(2)`. Run with `cargo run --example walkthrough` and press ENTER
//! between steps to inspect the process break with `pmap`/`htop`/`gdb`.

use std::io::Read;

use explist_alloc::HeapEngine;
use libc::sbrk;

fn block_until_enter_pressed() {
  println!("\n>>> Press ENTER to continue...");
  let _ = std::io::stdin().bytes().next();
}

fn print_program_break(label: &str) {
  println!(
    "[{}] PID = {}, program break (sbrk(0)) = {:?}",
    label,
    std::process::id(),
    unsafe { sbrk(0) },
  );
}

fn main() {
  env_logger::init();

  let mut heap = HeapEngine::with_sbrk().expect("heap init should succeed");

  print_program_break("start");
  block_until_enter_pressed();

  println!("\n[1] Allocate 4 bytes (u32)");
  let first = heap.alloc(4);
  println!("    -> {first:?}");
  unsafe {
    (first as *mut u32).write(0xDEADBEEF);
    println!("    value written = 0x{:X}", (first as *mut u32).read());
  }
  block_until_enter_pressed();

  println!("\n[2] Allocate 12 bytes");
  let second = heap.alloc(12);
  println!("    -> {second:?}");
  unsafe {
    std::ptr::write_bytes(second, 0xAB, 12);
  }
  block_until_enter_pressed();

  println!("\n[3] Allocate 8 bytes (u64), observe alignment");
  let third = heap.alloc(8);
  println!("    -> {third:?}, addr % 8 = {}", (third as usize) % 8);
  block_until_enter_pressed();

  println!("\n[4] Free the first block");
  heap.free(first);
  println!("    consistency check: {}", heap.check(true));
  block_until_enter_pressed();

  println!("\n[5] Allocate 2 bytes (may reuse the freed block)");
  let fourth = heap.alloc(2);
  println!(
    "    -> {fourth:?} (reused first block? {})",
    fourth == first
  );
  block_until_enter_pressed();

  print_program_break("before large alloc");
  println!("\n[6] Allocate 64 KiB, forcing heap extension");
  let big = heap.alloc(64 * 1024);
  println!("    -> {big:?}");
  print_program_break("after large alloc");

  println!("\nstats: {:?}", heap.stats());
  println!("\n[7] End of walkthrough.");
}
