//! Blink demo - LED blinking on an STM32F103 ("Blue Pill"), scheduled by
//! whichever policy the crate was built with.
//!
//! Each task does one unit of work per activation and calls `os_yield()`
//! to hand back control — under round-robin that's "run once per ring
//! pass," under periodic/preemptive it's "run once per period," so the
//! same task body works under any of the three policies.

#![no_std]
#![no_main]

use cortex_m_rt::entry;
use krtos::{os_kernel_init, os_task_create, os_yield, OsStkElement, TaskConfig};

#[cfg(feature = "pac")]
use stm32_metapac as pac;

static mut BLINK_STACK: [OsStkElement; 64] = [0; 64];
static mut HEARTBEAT_STACK: [OsStkElement; 64] = [0; 64];

#[cfg(feature = "pac")]
fn led_init() {
    pac::RCC.apb2enr().modify(|w| w.set_iopcen(true));
    pac::GPIOC
        .crh()
        .modify(|w| w.set_mode(13 - 8, pac::gpio::vals::Mode::OUTPUT50MHZ));
    pac::GPIOC
        .crh()
        .modify(|w| w.set_cnf(13 - 8, pac::gpio::vals::CnfOut::PUSHPULL));
}

#[cfg(feature = "pac")]
fn led_on() {
    pac::GPIOC.bsrr().write(|w| w.set_br(13, true));
}

#[cfg(feature = "pac")]
fn led_off() {
    pac::GPIOC.bsrr().write(|w| w.set_bs(13, true));
}

#[cfg(not(feature = "pac"))]
fn led_init() {}
#[cfg(not(feature = "pac"))]
fn led_on() {}
#[cfg(not(feature = "pac"))]
fn led_off() {}

extern "C" fn blink_task() -> ! {
    krtos::info!("blink task started");
    let mut lit = false;
    loop {
        lit = !lit;
        if lit {
            led_on();
        } else {
            led_off();
        }
        let _ = os_yield();
    }
}

extern "C" fn heartbeat_task() -> ! {
    krtos::info!("heartbeat task started");
    loop {
        krtos::info!("tick");
        let _ = os_yield();
    }
}

#[entry]
fn main() -> ! {
    led_init();

    #[allow(static_mut_refs)]
    let blink_stack = unsafe { &mut BLINK_STACK };
    #[allow(static_mut_refs)]
    let heartbeat_stack = unsafe { &mut HEARTBEAT_STACK };

    os_task_create(TaskConfig {
        entry: blink_task,
        stack: blink_stack,
        period: 500,
        priority: 5,
    })
    .expect("blink task creation failed");

    os_task_create(TaskConfig {
        entry: heartbeat_task,
        stack: heartbeat_stack,
        period: 1000,
        priority: 1,
    })
    .expect("heartbeat task creation failed");

    krtos::info!("starting kernel");

    // 1 ms tick quantum. `os_kernel_init` only returns on failure.
    let _ = os_kernel_init(1);

    loop {
        cortex_m::asm::bkpt();
    }
}
